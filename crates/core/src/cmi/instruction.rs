//! Purge instructions sent with a node update.

/// Child collections the player asks to be replaced, as sent in `i_set`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionMask(u8);

impl InstructionMask {
    pub const COMMENTS: u8 = 8;
    pub const CORRECT_RESPONSES: u8 = 4;
    pub const INTERACTIONS: u8 = 2;
    pub const OBJECTIVES: u8 = 1;

    const ALL: u8 = Self::COMMENTS | Self::CORRECT_RESPONSES | Self::INTERACTIONS | Self::OBJECTIVES;

    /// Values above 15 purge everything, negative values nothing.
    #[must_use]
    pub fn from_raw(raw: i64) -> Self {
        Self(u8::try_from(raw.clamp(0, i64::from(Self::ALL))).unwrap_or(Self::ALL))
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }
}

/// Child collections the package keeps at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WantFlags {
    pub comments: bool,
    pub interactions: bool,
    pub objectives: bool,
}

impl WantFlags {
    pub const ALL: Self = Self { comments: true, interactions: true, objectives: true };
}

/// Child rows to delete before reinserting a node's collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgePlan {
    pub comments: bool,
    pub correct_responses: bool,
    pub interactions: bool,
    pub objectives: bool,
}

impl PurgePlan {
    /// Correct responses hang off interactions, so both follow the
    /// interactions want-flag and go whenever their interactions go.
    #[must_use]
    pub const fn new(mask: InstructionMask, want: WantFlags) -> Self {
        Self {
            comments: want.comments && mask.contains(InstructionMask::COMMENTS),
            correct_responses: want.interactions
                && (mask.contains(InstructionMask::CORRECT_RESPONSES)
                    || mask.contains(InstructionMask::INTERACTIONS)),
            interactions: want.interactions && mask.contains(InstructionMask::INTERACTIONS),
            objectives: want.objectives && mask.contains(InstructionMask::OBJECTIVES),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.comments || self.correct_responses || self.interactions || self.objectives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mask_purges_everything() {
        let plan = PurgePlan::new(InstructionMask::from_raw(15), WantFlags::ALL);
        assert_eq!(
            plan,
            PurgePlan { comments: true, correct_responses: true, interactions: true, objectives: true }
        );
    }

    #[test]
    fn zero_mask_purges_nothing() {
        assert!(PurgePlan::new(InstructionMask::from_raw(0), WantFlags::ALL).is_empty());
    }

    #[test]
    fn single_bits_map_to_single_tables() {
        let comments = PurgePlan::new(InstructionMask::from_raw(8), WantFlags::ALL);
        assert!(comments.comments && !comments.interactions && !comments.objectives);

        let objectives = PurgePlan::new(InstructionMask::from_raw(1), WantFlags::ALL);
        assert!(objectives.objectives && !objectives.comments);

        let mixed = PurgePlan::new(InstructionMask::from_raw(6), WantFlags::ALL);
        assert!(mixed.correct_responses && mixed.interactions);
        assert!(!mixed.comments && !mixed.objectives);
    }

    #[test]
    fn purging_interactions_takes_their_correct_responses() {
        let plan = PurgePlan::new(InstructionMask::from_raw(2), WantFlags::ALL);
        assert!(plan.interactions && plan.correct_responses);

        let responses_only = PurgePlan::new(InstructionMask::from_raw(4), WantFlags::ALL);
        assert!(responses_only.correct_responses && !responses_only.interactions);
    }

    #[test]
    fn want_flags_gate_each_table() {
        let want = WantFlags { comments: false, interactions: false, objectives: true };
        let plan = PurgePlan::new(InstructionMask::from_raw(15), want);
        assert_eq!(
            plan,
            PurgePlan {
                comments: false,
                correct_responses: false,
                interactions: false,
                objectives: true
            }
        );
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(InstructionMask::from_raw(16).bits(), 15);
        assert_eq!(InstructionMask::from_raw(-3).bits(), 0);
    }
}
