/// Moves across a fixed, pre-supplied list of sibling reading ids.
///
/// The list is never re-fetched; it arrives with the navigation (explicit
/// state first, `ids=` query second) and is kept sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingNavigator {
    ids: Vec<u64>,
    current: usize,
}

impl ReadingNavigator {
    pub fn new(state_ids: &[u64], query_ids: Option<&str>) -> Self {
        let mut ids: Vec<u64> = if state_ids.is_empty() {
            query_ids.map(parse_id_list).unwrap_or_default()
        } else {
            state_ids.iter().copied().filter(|id| *id > 0).collect()
        };
        ids.sort_unstable();
        ids.dedup();
        Self { ids, current: 0 }
    }

    /// Points the navigator at the reading being opened, inserting it if it was
    /// not part of the supplied list. Returns the parsed id when it is valid.
    pub fn open(&mut self, reading_id: &str) -> Option<u64> {
        let Some(id) = parse_id(reading_id) else {
            self.current = 0;
            return None;
        };
        self.current = match self.ids.binary_search(&id) {
            Ok(index) => index,
            Err(index) => {
                self.ids.insert(index, id);
                index
            }
        };
        Some(id)
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_id(&self) -> Option<u64> {
        self.ids.get(self.current).copied()
    }

    pub fn total(&self) -> usize {
        self.ids.len()
    }

    pub fn can_go_previous(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.current + 1 < self.ids.len()
    }

    pub fn previous(&mut self) -> Option<u64> {
        if !self.can_go_previous() {
            return None;
        }
        self.current -= 1;
        self.current_id()
    }

    pub fn next(&mut self) -> Option<u64> {
        if !self.can_go_next() {
            return None;
        }
        self.current += 1;
        self.current_id()
    }

    /// "Record i of n", or empty when there is nothing to navigate.
    pub fn label(&self) -> String {
        if self.ids.is_empty() {
            return String::new();
        }
        format!("Record {} of {}", self.current + 1, self.ids.len())
    }

    /// Query string carried along when moving, e.g. `ids=3,5,8`.
    pub fn query(&self) -> String {
        let joined: Vec<String> = self.ids.iter().map(u64::to_string).collect();
        format!("ids={}", joined.join(","))
    }
}

/// Positive whole numbers from a comma-separated list; anything else is skipped.
pub fn parse_id_list(value: &str) -> Vec<u64> {
    value.split(',').filter_map(parse_id).collect()
}

fn parse_id(value: &str) -> Option<u64> {
    let number: f64 = value.trim().parse().ok()?;
    (number.is_finite() && number >= 1.0 && number.fract() == 0.0 && number <= u64::MAX as f64)
        .then_some(number as u64)
}
