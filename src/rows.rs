use std::collections::HashMap;

use crate::model::Token;

/// Tokens sharing one exact vertical position, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub y: f64,
    pub tokens: Vec<Token>,
}

impl Row {
    pub fn first_text(&self) -> Option<&str> {
        self.tokens.first().map(|token| token.text.as_str())
    }
}

/// Groups tokens into rows keyed by exact `y`.
///
/// Two tokens land in the same row only when their `y` values are
/// bitwise equal (after folding `-0.0` into `0.0`). There is no tolerance
/// window, so a line whose glyphs are reported at slightly different
/// heights is split into several rows.
#[derive(Debug, Default)]
pub struct RowCollector {
    index: HashMap<u64, usize>,
    rows: Vec<Row>,
}

impl RowCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        let key = row_key(token.y);
        match self.index.get(&key) {
            Some(&slot) => self.rows[slot].tokens.push(token),
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(Row {
                    y: token.y,
                    tokens: vec![token],
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the collector; no token can be added afterwards.
    pub fn finish(self) -> Rows {
        let mut rows = self.rows;
        rows.sort_by(|a, b| a.y.total_cmp(&b.y));
        Rows(rows)
    }
}

impl Extend<Token> for RowCollector {
    fn extend<I: IntoIterator<Item = Token>>(&mut self, iter: I) {
        for token in iter {
            self.push(token);
        }
    }
}

impl FromIterator<Token> for RowCollector {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut collector = RowCollector::new();
        collector.extend(iter);
        collector
    }
}

fn row_key(y: f64) -> u64 {
    // -0.0 + 0.0 == +0.0
    (y + 0.0).to_bits()
}

/// Completed rows in ascending `y` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows(Vec<Row>);

impl Rows {
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The row with the largest `y`.
    pub fn last(&self) -> Option<&Row> {
        self.0.last()
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(row: &Row) -> Vec<&str> {
        row.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn groups_by_exact_y_in_ascending_order() {
        let rows = RowCollector::from_iter(vec![
            Token::new("c", 0.0, 7.5),
            Token::new("a", 0.0, 1.25),
            Token::new("d", 2.0, 7.5),
            Token::new("b", 0.0, 3.0),
        ])
        .finish();

        let ys: Vec<f64> = rows.iter().map(|r| r.y).collect();
        assert_eq!(ys, vec![1.25, 3.0, 7.5]);
        assert_eq!(texts(rows.last().unwrap()), vec!["c", "d"]);
    }

    #[test]
    fn keeps_arrival_order_within_row() {
        let rows = RowCollector::from_iter(vec![
            Token::new("right", 9.0, 2.0),
            Token::new("left", 1.0, 2.0),
        ])
        .finish();
        assert_eq!(rows.len(), 1);
        assert_eq!(texts(rows.iter().next().unwrap()), vec!["right", "left"]);
    }

    #[test]
    fn nearly_equal_y_values_are_separate_rows() {
        let rows = RowCollector::from_iter(vec![
            Token::new("a", 0.0, 4.0),
            Token::new("b", 0.0, 4.0 + 1e-9),
        ])
        .finish();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn negative_zero_shares_row_with_zero() {
        let rows =
            RowCollector::from_iter(vec![Token::new("a", 0.0, 0.0), Token::new("b", 5.0, -0.0)])
                .finish();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn empty_collector_finishes_empty() {
        let collector = RowCollector::new();
        assert!(collector.is_empty());
        let rows = collector.finish();
        assert!(rows.is_empty());
        assert!(rows.last().is_none());
    }
}
