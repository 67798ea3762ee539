use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use crate::account::Candidate;
use crate::auth;
use crate::error::{Result, StratusError};
use crate::resolve::Scope;

/// A selection oracle over a candidate list.
///
/// Policy, in order: an empty list fails with `NoCandidates`; a single
/// candidate is returned without prompting; a preferred identifier matching
/// one of the candidates is returned without prompting; otherwise the chooser
/// blocks on human input until a candidate is picked, or fails with
/// `SelectionAborted`. A chooser never mutates the list it is given.
pub trait Chooser {
    fn choose<'a, C: Candidate>(
        &self,
        scope: Scope,
        candidates: &'a [C],
        preferred: Option<&str>,
    ) -> Result<&'a C>;
}

/// Chooser that renders a select list on the terminal.
#[derive(Debug, Default)]
pub struct TerminalChooser;

impl TerminalChooser {
    pub fn new() -> Self {
        Self
    }
}

impl Chooser for TerminalChooser {
    fn choose<'a, C: Candidate>(
        &self,
        scope: Scope,
        candidates: &'a [C],
        preferred: Option<&str>,
    ) -> Result<&'a C> {
        if candidates.is_empty() {
            return Err(StratusError::NoCandidates(scope));
        }
        if candidates.len() == 1 {
            return Ok(&candidates[0]);
        }
        if let Some(preferred) = preferred {
            if let Some(hit) = candidates.iter().find(|c| c.id() == preferred) {
                return Ok(hit);
            }
        }
        if auth::is_non_interactive() {
            return Err(StratusError::SelectionAborted);
        }

        let items: Vec<String> = candidates
            .iter()
            .map(|c| {
                if c.label() == c.id() {
                    c.id().to_string()
                } else {
                    format!("{} ({})", c.label(), c.id())
                }
            })
            .collect();

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Choose your {}", scope.noun()))
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(|e| match e {
                dialoguer::Error::IO(ref io) if io.kind() == std::io::ErrorKind::Interrupted => {
                    StratusError::SelectionAborted
                }
                e => StratusError::Other(format!("Failed to read selection: {}", e)),
            })?;

        match selection {
            Some(index) => Ok(&candidates[index]),
            None => Err(StratusError::SelectionAborted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Tenant;
    use serial_test::serial;

    fn tenant(id: &str, name: &str) -> Tenant {
        Tenant {
            tenant_id: id.to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn test_empty_list_fails() {
        let chooser = TerminalChooser::new();
        let candidates: Vec<Tenant> = vec![];
        let err = chooser
            .choose(Scope::Tenant, &candidates, None)
            .unwrap_err();
        assert!(matches!(err, StratusError::NoCandidates(Scope::Tenant)));
    }

    #[test]
    fn test_single_candidate_returned_without_prompting() {
        let chooser = TerminalChooser::new();
        let candidates = vec![tenant("t1", "Contoso")];
        let chosen = chooser
            .choose(Scope::Tenant, &candidates, None)
            .unwrap();
        assert_eq!(chosen.tenant_id, "t1");
    }

    #[test]
    fn test_preferred_match_returned_without_prompting() {
        let chooser = TerminalChooser::new();
        let candidates = vec![tenant("t1", "Contoso"), tenant("t2", "Fabrikam")];
        let chosen = chooser
            .choose(Scope::Tenant, &candidates, Some("t2"))
            .unwrap();
        assert_eq!(chosen.tenant_id, "t2");
    }

    #[test]
    #[serial]
    fn test_multi_candidate_aborts_when_non_interactive() {
        std::env::set_var("STRATUS_NON_INTERACTIVE", "1");
        let chooser = TerminalChooser::new();
        let candidates = vec![tenant("t1", "Contoso"), tenant("t2", "Fabrikam")];
        let err = chooser
            .choose(Scope::Tenant, &candidates, Some("t9"))
            .unwrap_err();
        std::env::remove_var("STRATUS_NON_INTERACTIVE");
        assert!(matches!(err, StratusError::SelectionAborted));
    }
}
