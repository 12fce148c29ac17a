use std::panic::{AssertUnwindSafe, catch_unwind};

use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};
use tracing::{debug, error};

use crate::error::MenuError;
use crate::layout::POINTS_PER_UNIT;
use crate::model::Token;
use crate::rows::{RowCollector, Rows};

/// Largest horizontal jump, in ems, that still continues the current token.
const MAX_GAP_EM: f64 = 0.5;

/// Baseline drift, in ems, tolerated inside one token.
const BASELINE_TOLERANCE_EM: f64 = 0.1;

/// Where the previous glyph ended, in user space.
#[derive(Debug, Clone, Copy)]
struct Pen {
    baseline: f64,
    end: f64,
    size: f64,
}

impl Pen {
    fn continues_at(&self, px: f64, py: f64) -> bool {
        (py - self.baseline).abs() <= self.size * BASELINE_TOLERANCE_EM
            && (px - self.end).abs() <= self.size * MAX_GAP_EM
    }
}

/// `OutputDev` that joins glyphs drawn in one run into a [`Token`].
///
/// pdf-extract reports each string of a `TJ` array as its own word, so word
/// boundaries are not token boundaries. A token ends when the text position
/// is set again (`Td`, `Tm`, `T*`), at the end of a page, or when the next
/// glyph leaves the baseline or jumps away from where the previous glyph
/// ended. The token sits at the position of its first glyph, converted to
/// layout units measured from the top-left corner of the media box.
pub struct TokenSink {
    collector: RowCollector,
    media_box: Option<MediaBox>,
    page: u32,
    pending: Option<Token>,
    pen: Option<Pen>,
}

impl TokenSink {
    pub fn new() -> Self {
        Self {
            collector: RowCollector::new(),
            media_box: None,
            page: 0,
            pending: None,
            pen: None,
        }
    }

    /// Adds a glyph drawn at user-space point `(px, py)` that advances the
    /// pen by `advance`. `size` is the rendered font size.
    fn glyph(&mut self, px: f64, py: f64, advance: f64, size: f64, text: &str) {
        let size = if size.is_finite() && size > 0.0 { size } else { 1.0 };
        let continues = self.pending.is_some()
            && self.pen.is_some_and(|pen| pen.continues_at(px, py));

        if continues {
            if let Some(token) = self.pending.as_mut() {
                token.text.push_str(text);
            }
        } else {
            self.flush();
            let (left, top) = self
                .media_box
                .map(|mb| (mb.llx, mb.ury))
                .unwrap_or((0.0, 0.0));
            let x = (px - left) / POINTS_PER_UNIT;
            let y = (top - py) / POINTS_PER_UNIT;
            self.pending = Some(Token::new(text, x, y));
        }

        self.pen = Some(Pen {
            baseline: py,
            end: px + advance,
            size,
        });
    }

    fn flush(&mut self) {
        self.pen = None;
        let Some(token) = self.pending.take() else {
            return;
        };
        if token.text.trim().is_empty() {
            return;
        }
        if !token.x.is_finite() || !token.y.is_finite() {
            debug!(page = self.page, text = %token.text, "dropping token without a finite position");
            return;
        }
        self.collector.push(token);
    }

    pub fn finish(mut self) -> Rows {
        self.flush();
        self.collector.finish()
    }
}

impl Default for TokenSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDev for TokenSink {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.flush();
        debug!(page = page_num, rows = self.collector.len(), "begin page");
        self.page = page_num;
        self.media_box = Some(*media_box);
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        // font size as scaled by the text rendering matrix
        let size = font_size * (trm.m11 * trm.m22).abs().sqrt();
        self.glyph(trm.m31, trm.m32, width * size, size, char);
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        self.flush();
        Ok(())
    }
}

/// Decodes a PDF and groups its text into rows.
///
/// Fails as a whole: rows gathered before a decode error are discarded.
pub fn collect_rows(bytes: &[u8]) -> Result<Rows, MenuError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<Rows, MenuError> {
        let doc = Document::load_mem(bytes).map_err(|e| MenuError::Decode(e.to_string()))?;
        let mut sink = TokenSink::new();
        pdf_extract::output_doc(&doc, &mut sink).map_err(|e| MenuError::Decode(e.to_string()))?;
        Ok(sink.finish())
    }));

    match outcome {
        Ok(result) => result,
        Err(_) => {
            error!("pdf text extraction panicked");
            Err(MenuError::Decode("text extraction aborted".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: f64 = 10.0;
    const ADVANCE: f64 = 5.0;

    fn media_box() -> MediaBox {
        MediaBox {
            llx: 0.0,
            lly: 0.0,
            urx: 595.0,
            ury: 842.0,
        }
    }

    /// Draws `text` as one string element starting at `(x, y)` and returns
    /// where the pen ended.
    fn show(sink: &mut TokenSink, x: f64, y: f64, text: &str) -> f64 {
        sink.begin_word().unwrap();
        let mut px = x;
        for c in text.chars() {
            sink.glyph(px, y, ADVANCE, SIZE, &c.to_string());
            px += ADVANCE;
        }
        sink.end_word().unwrap();
        px
    }

    fn texts(rows: &Rows) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.tokens.iter().map(|t| t.text.clone()).collect())
            .collect()
    }

    #[test]
    fn converts_points_to_top_left_layout_units() {
        let mut sink = TokenSink::new();
        sink.begin_page(1, &media_box(), None).unwrap();
        show(&mut sink, 80.0, 842.0 - 32.0, "1.1.2024");
        sink.end_page().unwrap();

        let rows = sink.finish();
        let row = rows.last().unwrap();
        assert_eq!(row.y, 2.0);
        assert_eq!(row.tokens[0], Token::new("1.1.2024", 5.0, 2.0));
    }

    #[test]
    fn kerned_strings_of_one_run_stay_one_token() {
        let mut sink = TokenSink::new();
        sink.begin_page(1, &media_box(), None).unwrap();
        let end = show(&mut sink, 96.0, 700.0, "Kana");
        // [(Kana) -15 (keitto)] TJ
        show(&mut sink, end + 0.15, 700.0, "keitto");
        sink.end_page().unwrap();

        let rows = sink.finish();
        assert_eq!(texts(&rows), vec![vec!["Kanakeitto".to_string()]]);
        assert_eq!(rows.last().unwrap().tokens[0].x, 6.0);
    }

    #[test]
    fn repositioning_starts_a_new_token() {
        let mut sink = TokenSink::new();
        sink.begin_page(1, &media_box(), None).unwrap();
        let end = show(&mut sink, 32.0, 700.0, "Lounas");
        sink.end_line().unwrap();
        show(&mut sink, end, 700.0, "Soup");
        sink.end_page().unwrap();

        let rows = sink.finish();
        assert_eq!(
            texts(&rows),
            vec![vec!["Lounas".to_string(), "Soup".to_string()]]
        );
    }

    #[test]
    fn far_jump_or_new_baseline_starts_a_new_token() {
        let mut sink = TokenSink::new();
        sink.begin_page(1, &media_box(), None).unwrap();
        let end = show(&mut sink, 32.0, 700.0, "Lounas");
        show(&mut sink, end + 40.0, 700.0, "Soup");
        show(&mut sink, 32.0, 680.0, "Stew");
        sink.end_page().unwrap();

        let rows = sink.finish();
        assert_eq!(
            texts(&rows),
            vec![
                vec!["Lounas".to_string(), "Soup".to_string()],
                vec!["Stew".to_string()],
            ]
        );
    }

    #[test]
    fn whitespace_only_runs_are_dropped() {
        let mut sink = TokenSink::new();
        sink.begin_page(1, &media_box(), None).unwrap();
        show(&mut sink, 96.0, 780.0, " ");
        sink.end_line().unwrap();
        show(&mut sink, 96.0, 800.0, "Soup");
        sink.end_page().unwrap();

        let rows = sink.finish();
        assert_eq!(texts(&rows), vec![vec!["Soup".to_string()]]);
    }

    #[test]
    fn tokens_do_not_continue_across_pages() {
        let mut sink = TokenSink::new();
        sink.begin_page(1, &media_box(), None).unwrap();
        let end = show(&mut sink, 96.0, 700.0, "Soup");
        sink.end_page().unwrap();
        sink.begin_page(2, &media_box(), None).unwrap();
        show(&mut sink, end, 700.0, "Stew");
        sink.end_page().unwrap();

        let rows = sink.finish();
        assert_eq!(
            texts(&rows),
            vec![vec!["Soup".to_string(), "Stew".to_string()]]
        );
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = collect_rows(b"definitely not a pdf");
        assert!(matches!(result, Err(MenuError::Decode(_))));
    }
}
