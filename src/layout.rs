//! Positional column layout of an expense sheet.

/// Participants of the default layout, in share-column order.
pub const DEFAULT_PARTICIPANTS: [&str; 3] = ["Hamza", "Zumair", "Faisal"];

/// A participant and the column holding their share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Name used as the key in the shares map
    pub name: String,
    /// 0-based column position of the share cell
    pub column: usize,
}

/// Maps record fields to fixed column positions.
///
/// Columns are bound by position, never by header label. The default layout
/// leaves column 0 unused and reads date, description, amount and payer from
/// columns 1 to 4, followed by one share column per participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Date column
    pub date: usize,
    /// Description column
    pub description: usize,
    /// Amount column
    pub amount: usize,
    /// Payer column
    pub paid_by: usize,
    /// Share columns, in output order
    pub participants: Vec<Participant>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new().with_participants(DEFAULT_PARTICIPANTS)
    }
}

impl ColumnLayout {
    /// Create the default column positions with no participants.
    pub fn new() -> Self {
        Self {
            date: 1,
            description: 2,
            amount: 3,
            paid_by: 4,
            participants: Vec::new(),
        }
    }

    /// Replace the participants; their shares are read from consecutive columns
    /// right after the payer column.
    pub fn with_participants<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let first = self.paid_by + 1;
        self.participants = names
            .into_iter()
            .enumerate()
            .map(|(offset, name)| Participant {
                name: name.into(),
                column: first + offset,
            })
            .collect();
        self
    }

    /// Set the first column of the layout; every other column follows it.
    ///
    /// `with_first_column(1)` is the default layout.
    pub fn with_first_column(mut self, first: usize) -> Self {
        self.date = first;
        self.description = first + 1;
        self.amount = first + 2;
        self.paid_by = first + 3;
        for (offset, participant) in self.participants.iter_mut().enumerate() {
            participant.column = first + 4 + offset;
        }
        self
    }

    /// Participant names in column order.
    pub fn participant_names(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.name.as_str()).collect()
    }
}
