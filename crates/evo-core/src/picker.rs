//! Fuzzy picker backing every select field of the console.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::filter::SelectOption;

/// A list of options narrowed by a typed query.
pub struct Picker {
    title: String,
    options: Vec<SelectOption>,
    query: String,
    /// Indices into `options`, best match first.
    matches: Vec<usize>,
    cursor: usize,
    matcher: SkimMatcherV2,
}

impl std::fmt::Debug for Picker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Picker")
            .field("title", &self.title)
            .field("query", &self.query)
            .field("matches", &self.matches.len())
            .finish()
    }
}

impl Picker {
    pub fn new(title: impl Into<String>, options: Vec<SelectOption>) -> Self {
        let matches = (0..options.len()).collect();
        Self {
            title: title.into(),
            options,
            query: String::new(),
            matches,
            cursor: 0,
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
        self.refresh();
    }

    pub fn pop(&mut self) {
        self.query.pop();
        self.refresh();
    }

    /// Options currently shown, best match first.
    pub fn visible(&self) -> impl Iterator<Item = &SelectOption> {
        self.matches.iter().map(|&i| &self.options[i])
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next(&mut self) {
        if self.cursor + 1 < self.matches.len() {
            self.cursor += 1;
        }
    }

    pub fn prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Option under the cursor.
    pub fn selected(&self) -> Option<&SelectOption> {
        self.matches.get(self.cursor).map(|&i| &self.options[i])
    }

    fn refresh(&mut self) {
        self.cursor = 0;
        if self.query.trim().is_empty() {
            self.matches = (0..self.options.len()).collect();
            return;
        }

        let mut scored: Vec<(usize, i64)> = self
            .options
            .iter()
            .enumerate()
            .filter_map(|(i, option)| {
                self.matcher
                    .fuzzy_match(&option.label, self.query.trim())
                    .map(|score| (i, score))
            })
            .collect();
        // Stable: equal scores keep option order.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        self.matches = scored.into_iter().map(|(i, _)| i).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker() -> Picker {
        Picker::new(
            "Cliente",
            vec![
                SelectOption::new("Loja Centro", "1"),
                SelectOption::new("Auto Sul", "2"),
                SelectOption::new("Loja Norte", "3"),
            ],
        )
    }

    #[test]
    fn empty_query_shows_everything_in_order() {
        let p = picker();
        let labels: Vec<_> = p.visible().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Loja Centro", "Auto Sul", "Loja Norte"]);
        assert_eq!(p.selected().map(|o| o.value.as_str()), Some("1"));
    }

    #[test]
    fn query_narrows_and_resets_cursor() {
        let mut p = picker();
        p.next();
        for c in "norte".chars() {
            p.push(c);
        }
        assert_eq!(p.cursor(), 0);
        assert_eq!(p.selected().map(|o| o.value.as_str()), Some("3"));

        for _ in 0.."norte".len() {
            p.pop();
        }
        assert_eq!(p.visible().count(), 3);
    }

    #[test]
    fn no_match_selects_nothing() {
        let mut p = picker();
        p.push('z');
        p.push('z');
        assert!(p.selected().is_none());
    }
}
