//! Staging selections one after another, asking for a decision per collision.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use docstage_core::models::{CandidateFile, CollisionRecord, ResolutionAction};
use docstage_staging::{
    partition_batch, validate_batch, FailedFile, FileValidator, Rejection, ResolutionSession,
};

/// One answer to a collision prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Resolve(ResolutionAction),
    /// Apply the action to this and every remaining collision of the selection
    ResolveAll(ResolutionAction),
    Cancel,
}

/// Parse a prompt answer. Single letters act on the current collision, upper
/// case on all remaining ones; full action names are accepted too.
pub fn parse_decision(input: &str) -> Option<Decision> {
    let input = input.trim();
    let action = match input.to_lowercase().as_str() {
        "c" | "cancel" => return Some(Decision::Cancel),
        "r" => ResolutionAction::Replace,
        "j" => ResolutionAction::Reject,
        "k" => ResolutionAction::KeepBoth,
        other => return other.parse().ok().map(Decision::Resolve),
    };

    if input.chars().all(|c| c.is_ascii_uppercase()) {
        Some(Decision::ResolveAll(action))
    } else {
        Some(Decision::Resolve(action))
    }
}

/// Where collision decisions come from
pub trait DecisionSource {
    fn decide(&mut self, collision: &CollisionRecord, remaining: usize) -> Result<Decision>;
}

/// Prompts on stdout and reads answers from stdin. End of input cancels.
pub struct PromptDecisions<R> {
    input: R,
}

impl PromptDecisions<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> PromptDecisions<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> DecisionSource for PromptDecisions<R> {
    fn decide(&mut self, collision: &CollisionRecord, remaining: usize) -> Result<Decision> {
        let mut stdout = io::stdout();
        writeln!(
            stdout,
            "\n'{}' ({} bytes) collides with staged file #{} ({} match, {} left)",
            collision.new_file.name(),
            collision.new_file.byte_size(),
            collision.existing_index + 1,
            collision.match_type,
            remaining
        )?;

        loop {
            write!(
                stdout,
                "[r]eplace / re[j]ect / [k]eep both / [c]ancel (capital letter = all): "
            )?;
            stdout.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Decision::Cancel);
            }
            match parse_decision(&line) {
                Some(decision) => return Ok(decision),
                None => writeln!(stdout, "Unrecognised answer: {}", line.trim())?,
            }
        }
    }
}

/// Result of staging every selection
#[derive(Debug, Default)]
pub struct StageReport {
    /// Resolved working collection, ready for upload
    pub working: Vec<CandidateFile>,
    pub rejected: Vec<Rejection>,
    pub failed: Vec<FailedFile>,
    /// Selections whose resolution the user cancelled
    pub cancelled: usize,
}

/// Stage selections in order. Each selection is validated, checked for
/// duplicates against everything staged before it, and resolved before the
/// next one starts.
pub async fn stage_selections(
    selections: Vec<Vec<CandidateFile>>,
    validator: &FileValidator,
    decisions: &mut dyn DecisionSource,
) -> Result<StageReport> {
    let mut report = StageReport::default();

    for selection in selections {
        let (accepted, rejected) = validate_batch(selection, validator);
        report.rejected.extend(rejected);

        let partition = partition_batch(accepted, &report.working).await;
        let working = std::mem::take(&mut report.working);
        let (mut session, failed) = ResolutionSession::from_partition(working, partition);
        report.failed.extend(failed);

        while let Some(collision) = session.current().cloned() {
            match decisions.decide(&collision, session.remaining())? {
                Decision::Resolve(action) => {
                    session.resolve(action)?;
                }
                Decision::ResolveAll(action) => {
                    session.resolve_all(action)?;
                }
                Decision::Cancel => {
                    session.cancel()?;
                    report.cancelled += 1;
                }
            }
        }

        report.working = session.finish()?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Decision>);

    impl DecisionSource for Scripted {
        fn decide(&mut self, _: &CollisionRecord, _: usize) -> Result<Decision> {
            self.0
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted decision left"))
        }
    }

    fn scripted(decisions: &[Decision]) -> Scripted {
        Scripted(decisions.iter().copied().collect())
    }

    fn pdf(name: &str, content: &[u8]) -> CandidateFile {
        CandidateFile::from_bytes(name, "application/pdf", content.to_vec())
    }

    fn validator() -> FileValidator {
        FileValidator::new(1024, vec!["application/pdf".to_string()])
    }

    fn names(files: &[CandidateFile]) -> Vec<&str> {
        files.iter().map(|f| f.name()).collect()
    }

    #[test]
    fn test_parse_decision() {
        assert_eq!(
            parse_decision("r\n"),
            Some(Decision::Resolve(ResolutionAction::Replace))
        );
        assert_eq!(
            parse_decision("J"),
            Some(Decision::ResolveAll(ResolutionAction::Reject))
        );
        assert_eq!(
            parse_decision("keep-both"),
            Some(Decision::Resolve(ResolutionAction::KeepBoth))
        );
        assert_eq!(parse_decision(" c "), Some(Decision::Cancel));
        assert_eq!(parse_decision("x"), None);
    }

    #[test]
    fn test_prompt_reads_until_valid_answer() {
        let collision = CollisionRecord {
            new_file: pdf("a.pdf", b"1"),
            existing_file: pdf("a.pdf", b"1"),
            existing_index: 0,
            match_type: docstage_core::models::MatchType::Exact,
        };
        let mut prompt = PromptDecisions::new("what\nk\n".as_bytes());
        assert_eq!(
            prompt.decide(&collision, 1).unwrap(),
            Decision::Resolve(ResolutionAction::KeepBoth)
        );

        let mut closed = PromptDecisions::new("".as_bytes());
        assert_eq!(closed.decide(&collision, 1).unwrap(), Decision::Cancel);
    }

    #[tokio::test]
    async fn test_second_selection_collides_with_first() {
        let selections = vec![
            vec![pdf("a.pdf", b"one"), pdf("b.pdf", b"two")],
            vec![pdf("a.pdf", b"one"), pdf("b.pdf", b"TWO"), pdf("c.pdf", b"3")],
        ];
        let mut decisions = scripted(&[
            Decision::Resolve(ResolutionAction::Reject),
            Decision::Resolve(ResolutionAction::KeepBoth),
        ]);

        let report = stage_selections(selections, &validator(), &mut decisions)
            .await
            .unwrap();

        assert_eq!(names(&report.working), vec!["a.pdf", "b.pdf", "b (1).pdf", "c.pdf"]);
        assert_eq!(report.cancelled, 0);
    }

    #[tokio::test]
    async fn test_cancel_keeps_previous_collection() {
        let selections = vec![
            vec![pdf("a.pdf", b"one")],
            vec![pdf("a.pdf", b"uno"), pdf("new.pdf", b"n")],
        ];
        let mut decisions = scripted(&[Decision::Cancel]);

        let report = stage_selections(selections, &validator(), &mut decisions)
            .await
            .unwrap();

        assert_eq!(names(&report.working), vec!["a.pdf"]);
        assert_eq!(report.working[0], pdf("a.pdf", b"one"));
        assert_eq!(report.cancelled, 1);
    }

    #[tokio::test]
    async fn test_resolve_all_and_rejections() {
        let selections = vec![
            vec![pdf("a.pdf", b"1"), pdf("b.pdf", b"2")],
            vec![
                pdf("a.pdf", b"9"),
                pdf("b.pdf", b"8"),
                CandidateFile::from_bytes("pic.gif", "image/gif", b"g".to_vec()),
            ],
        ];
        let mut decisions = scripted(&[Decision::ResolveAll(ResolutionAction::Replace)]);

        let report = stage_selections(selections, &validator(), &mut decisions)
            .await
            .unwrap();

        assert_eq!(report.working, vec![pdf("a.pdf", b"9"), pdf("b.pdf", b"8")]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].file.name(), "pic.gif");
    }
}
