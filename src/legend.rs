use tracing::warn;

use crate::error::LegendError;
use crate::model::Diet;
use crate::rows::Rows;

const ENTRY_SEPARATOR: &str = ", ";
const CODE_SEPARATOR: &str = " - ";

/// Splits a legend line such as `"Gluteeniton - G, Laktoositon - L"`.
///
/// Entries without `" - "` are skipped. When an entry holds more than one
/// separator only the first two parts are kept.
pub fn parse_legend(text: &str) -> Vec<Diet> {
    text.split(ENTRY_SEPARATOR)
        .filter_map(|entry| {
            let mut parts = entry.split(CODE_SEPARATOR);
            let name = parts.next()?;
            let code = parts.next()?;
            Some(Diet {
                name: name.to_string(),
                code: code.to_string(),
            })
        })
        .collect()
}

fn try_legend_from_rows(rows: &Rows) -> Result<Vec<Diet>, LegendError> {
    let last = rows.last().ok_or(LegendError::NoRows)?;
    Ok(last.first_text().map(parse_legend).unwrap_or_default())
}

/// Reads the legend from the first token of the bottom row.
///
/// Best effort: any failure is logged and yields an empty list.
pub fn legend_from_rows(rows: &Rows) -> Vec<Diet> {
    try_legend_from_rows(rows).unwrap_or_else(|err| {
        warn!(%err, "no diet legend");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Token;
    use crate::rows::RowCollector;

    fn diet(name: &str, code: &str) -> Diet {
        Diet {
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn drops_entries_without_separator() {
        assert_eq!(
            parse_legend("A - 1, B - 2, C"),
            vec![diet("A", "1"), diet("B", "2")]
        );
    }

    #[test]
    fn keeps_first_two_parts() {
        assert_eq!(parse_legend("A - 1 - x"), vec![diet("A", "1")]);
    }

    #[test]
    fn separators_need_surrounding_spaces() {
        assert!(parse_legend("A-1,B-2").is_empty());
        assert!(parse_legend("").is_empty());
    }

    #[test]
    fn reads_first_token_of_bottom_row() {
        let rows = RowCollector::from_iter(vec![
            Token::new("G - Gluteeniton, L - Laktoositon", 0.5, 40.0),
            Token::new("Sivu 1", 30.0, 40.0),
            Token::new("1.1.2024", 0.0, 1.0),
        ])
        .finish();
        assert_eq!(
            legend_from_rows(&rows),
            vec![diet("G", "Gluteeniton"), diet("L", "Laktoositon")]
        );
    }

    #[test]
    fn no_rows_is_recovered() {
        let rows = RowCollector::new().finish();
        assert_eq!(try_legend_from_rows(&rows), Err(LegendError::NoRows));
        assert!(legend_from_rows(&rows).is_empty());
    }

    #[test]
    fn bottom_row_without_legend_gives_no_diets() {
        let rows = RowCollector::from_iter(vec![Token::new("Soup", 5.0, 2.0)]).finish();
        assert!(legend_from_rows(&rows).is_empty());
    }
}
