use std::fmt;

use serde::{Deserialize, Serialize};

/// Wizard steps in their canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Keywords,
    Research,
    SourceReview,
    Draft,
    ScoreRefine,
    Final,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::Keywords => "Keywords",
            Step::Research => "Research",
            Step::SourceReview => "Source Review",
            Step::Draft => "Draft",
            Step::ScoreRefine => "Score & Refine",
            Step::Final => "Final",
        }
    }

    /// Call-to-action shown while the user is on this step
    pub fn call_to_action(self) -> &'static str {
        match self {
            Step::Keywords => "Start Research",
            Step::Research => "Review Sources",
            Step::SourceReview => "Generate Draft",
            Step::Draft => "Score & Refine",
            Step::ScoreRefine => "Publish Draft",
            Step::Final => "Create New Article",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The ordered steps a workflow walks through.
///
/// The folded variant runs scoring inside the Draft step and has no separate
/// Score & Refine step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSequence {
    pub fold_score_into_draft: bool,
}

impl StepSequence {
    pub fn standard() -> Self {
        Self { fold_score_into_draft: false }
    }

    pub fn folded() -> Self {
        Self { fold_score_into_draft: true }
    }

    pub fn steps(&self) -> &'static [Step] {
        const STANDARD: [Step; 6] = [
            Step::Keywords,
            Step::Research,
            Step::SourceReview,
            Step::Draft,
            Step::ScoreRefine,
            Step::Final,
        ];
        const FOLDED: [Step; 5] = [
            Step::Keywords,
            Step::Research,
            Step::SourceReview,
            Step::Draft,
            Step::Final,
        ];
        if self.fold_score_into_draft {
            &FOLDED
        } else {
            &STANDARD
        }
    }

    /// Zero-based index of a step, `None` if the sequence skips it
    pub fn index_of(&self, step: Step) -> Option<usize> {
        self.steps().iter().position(|s| *s == step)
    }

    /// Step after `step`, `None` at the terminal step
    pub fn next(&self, step: Step) -> Option<Step> {
        let index = self.index_of(step)?;
        self.steps().get(index + 1).copied()
    }

    /// Last step of the sequence
    pub fn terminal(&self) -> Step {
        self.steps().last().copied().unwrap_or(Step::Final)
    }

    /// Step at which scoring and refinement run
    pub fn scoring_step(&self) -> Step {
        if self.fold_score_into_draft {
            Step::Draft
        } else {
            Step::ScoreRefine
        }
    }
}

/// Remote (or simulated) operations the coordinator runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Keywords,
    Research,
    DeepResearch,
    SourceAnalysis,
    Draft,
    QualityAnalysis,
    Refine,
    Export,
}

impl Operation {
    /// Step at which the operation is available
    pub fn home_step(self, sequence: &StepSequence) -> Step {
        match self {
            Operation::Keywords => Step::Keywords,
            Operation::Research | Operation::DeepResearch => Step::Research,
            Operation::SourceAnalysis => Step::SourceReview,
            Operation::Draft => Step::Draft,
            Operation::QualityAnalysis | Operation::Refine => sequence.scoring_step(),
            Operation::Export => Step::Final,
        }
    }

    /// Whether success moves the workflow to the next step.
    ///
    /// Scoring never advances so the user can review the metrics first. When
    /// scoring is folded into Draft, the draft call stays put for the same
    /// reason.
    pub fn auto_advances(self, sequence: &StepSequence) -> bool {
        match self {
            Operation::Keywords
            | Operation::Research
            | Operation::DeepResearch
            | Operation::SourceAnalysis => true,
            Operation::Draft => !sequence.fold_score_into_draft,
            Operation::QualityAnalysis | Operation::Refine | Operation::Export => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Keywords => "Keywords processing",
            Operation::Research => "Research",
            Operation::DeepResearch => "Deep research",
            Operation::SourceAnalysis => "Source analysis",
            Operation::Draft => "Draft generation",
            Operation::QualityAnalysis => "Quality analysis",
            Operation::Refine => "Draft refinement",
            Operation::Export => "Article export",
        }
    }

    /// Message recorded when the backend fails without saying why
    pub fn failure_message(self) -> String {
        format!("{} failed", self.name())
    }

    /// Short identifier used in execution ids and progress frames
    pub fn slug(self) -> &'static str {
        match self {
            Operation::Keywords => "keywords",
            Operation::Research => "research",
            Operation::DeepResearch => "deep-research",
            Operation::SourceAnalysis => "source-analysis",
            Operation::Draft => "draft",
            Operation::QualityAnalysis => "quality",
            Operation::Refine => "refine",
            Operation::Export => "export",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_sequence_walks_every_step() {
        let sequence = StepSequence::standard();
        let mut step = Step::Keywords;
        let mut visited = vec![step];
        while let Some(next) = sequence.next(step) {
            assert!(next > step);
            visited.push(next);
            step = next;
        }
        assert_eq!(visited.len(), 6);
        assert_eq!(step, Step::Final);
    }

    #[test]
    fn folded_sequence_skips_score_refine() {
        let sequence = StepSequence::folded();
        assert_eq!(sequence.next(Step::Draft), Some(Step::Final));
        assert_eq!(sequence.index_of(Step::ScoreRefine), None);
        assert_eq!(sequence.index_of(Step::Final), Some(4));
        assert_eq!(Operation::QualityAnalysis.home_step(&sequence), Step::Draft);
        assert!(!Operation::Draft.auto_advances(&sequence));
    }

    #[test]
    fn both_sequences_end_on_final() {
        assert_eq!(StepSequence::standard().terminal(), Step::Final);
        assert_eq!(StepSequence::folded().terminal(), Step::Final);
        assert_eq!(Step::Final.call_to_action(), "Create New Article");
        assert_eq!(Step::SourceReview.call_to_action(), "Generate Draft");
    }

    #[test]
    fn scoring_never_advances() {
        for sequence in [StepSequence::standard(), StepSequence::folded()] {
            assert!(!Operation::QualityAnalysis.auto_advances(&sequence));
            assert!(!Operation::Refine.auto_advances(&sequence));
            assert!(Operation::Keywords.auto_advances(&sequence));
        }
    }

    #[test]
    fn failure_messages_name_the_operation() {
        assert_eq!(Operation::Keywords.failure_message(), "Keywords processing failed");
        assert_eq!(Operation::DeepResearch.failure_message(), "Deep research failed");
    }
}
