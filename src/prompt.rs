//! Interactive input collection.
//!
//! The questionnaire is a fixed, ordered list of [`Question`]s. A question may
//! depend on earlier answers: whether it is asked at all, its message, its
//! default and its validation [`Rule`] are all computed from the answers
//! collected so far. That is why creation mode and project kind come first.

use anyhow::{anyhow, bail, Context, Result};
use inquire::{validator::Validation, Confirm, CustomUserError, Select, Text};

use crate::{
    naming::{self, Rule},
    request::{CreationMode, ProjectKind, ProvisioningRequest},
};

/// One option of a select question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Asks the operator things. Implementations must only return answers that
/// satisfy `rule`.
pub trait Prompter {
    /// Returns the index of the chosen option
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the prompt was cancelled or failed
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize>;

    /// # Errors
    ///
    /// Returns an [`Err`] if the prompt was cancelled or failed
    fn text(&mut self, message: &str, default: Option<&str>, rule: Rule) -> Result<String>;

    /// # Errors
    ///
    /// Returns an [`Err`] if the prompt was cancelled or failed
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
}

/// Terminal prompts. Invalid input is re-asked by `inquire` itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize> {
        let labels = choices.iter().map(|c| c.label).collect::<Vec<_>>();

        Ok(Select::new(message, labels)
            .raw_prompt()
            .context("Prompt aborted")?
            .index)
    }

    fn text(&mut self, message: &str, default: Option<&str>, rule: Rule) -> Result<String> {
        let validator = move |input: &str| -> Result<Validation, CustomUserError> {
            Ok(match rule.check(input) {
                Ok(()) => Validation::Valid,
                Err(e) => Validation::Invalid(e.to_string().into()),
            })
        };

        let mut prompt = Text::new(message).with_validator(validator);
        if let Some(default) = default {
            prompt = prompt.with_initial_value(default);
        }

        prompt.prompt().context("Prompt aborted")
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Confirm::new(message)
            .with_default(default)
            .prompt()
            .context("Prompt aborted")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CreationMode,
    ProjectKind,
    ProjectName,
    CssPrefix,
    PublicPath,
    DevPort,
    LibraryBranchA,
    LibraryBranchB,
    AutoInstall,
}

pub enum Ask {
    Select(&'static [Choice]),
    Text {
        default: fn(&Answers) -> Option<&'static str>,
        rule: fn(&Answers) -> Rule,
    },
    Confirm {
        default: bool,
    },
}

pub struct Question {
    pub field: Field,
    pub when: fn(&Answers) -> bool,
    pub message: fn(&Answers) -> String,
    pub ask: Ask,
}

const MODES: &[Choice] = &[
    Choice {
        value: "derived",
        label: "Derived (css prefix and public path are parsed from the project name)",
    },
    Choice {
        value: "explicit",
        label: "Explicit (enter css prefix and public path yourself)",
    },
];

const KINDS: &[Choice] = &[
    Choice {
        value: "standard",
        label: "Standard product",
    },
    Choice {
        value: "custom",
        label: "Custom project",
    },
];

fn always(_: &Answers) -> bool {
    true
}

fn no_default(_: &Answers) -> Option<&'static str> {
    None
}

fn any_text(_: &Answers) -> Rule {
    Rule::Any
}

/// The questionnaire, in the order it is asked.
#[must_use]
pub fn questions() -> Vec<Question> {
    vec![
        Question {
            field: Field::CreationMode,
            when: always,
            message: |_| "Creation mode:".into(),
            ask: Ask::Select(MODES),
        },
        Question {
            field: Field::ProjectKind,
            when: always,
            message: |_| "Sub-project kind:".into(),
            ask: Ask::Select(KINDS),
        },
        Question {
            field: Field::ProjectName,
            when: always,
            message: |a| match a.kind() {
                ProjectKind::Standard => {
                    "Sub-project name (yst-cloudt-web-<domain>, e.g. yst-cloudt-web-support):"
                        .into()
                }
                ProjectKind::Custom => {
                    "Sub-project name (yst-<project>-web-<domain>, e.g. yst-lm-web-support):"
                        .into()
                }
            },
            ask: Ask::Text {
                default: |a| match a.kind() {
                    ProjectKind::Standard => Some("yst-cloudt-web-"),
                    ProjectKind::Custom => None,
                },
                rule: |a| Rule::ProjectName(a.kind(), a.mode()),
            },
        },
        Question {
            field: Field::CssPrefix,
            when: |a| a.mode() == CreationMode::Explicit,
            message: |_| "Antd css prefix (prefixCls in project.config.ts, e.g. yst-support):".into(),
            ask: Ask::Text {
                default: no_default,
                rule: any_text,
            },
        },
        Question {
            field: Field::PublicPath,
            when: |a| a.mode() == CreationMode::Explicit,
            message: |_| "Public path (publicPath in build.config.js, e.g. /support/):".into(),
            ask: Ask::Text {
                default: no_default,
                rule: |_| Rule::PublicPath,
            },
        },
        Question {
            field: Field::DevPort,
            when: always,
            message: |_| "Dev server port (e.g. 3020):".into(),
            ask: Ask::Text {
                default: no_default,
                rule: |_| Rule::DevPort,
            },
        },
        Question {
            field: Field::LibraryBranchA,
            when: always,
            message: |_| "cloudt library branch to import as a subtree (empty to skip):".into(),
            ask: Ask::Text {
                default: no_default,
                rule: any_text,
            },
        },
        Question {
            field: Field::LibraryBranchB,
            when: always,
            message: |_| "stdShare library branch to import as a subtree (empty to skip):".into(),
            ask: Ask::Text {
                default: no_default,
                rule: any_text,
            },
        },
        Question {
            field: Field::AutoInstall,
            when: always,
            message: |_| "Install dependencies now?".into(),
            ask: Ask::Confirm { default: true },
        },
    ]
}

/// Answers collected so far.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Answers {
    mode: Option<CreationMode>,
    kind: Option<ProjectKind>,
    project_name: Option<String>,
    css_prefix: Option<String>,
    public_path: Option<String>,
    dev_port: Option<String>,
    library_branch_a: Option<String>,
    library_branch_b: Option<String>,
    auto_install: Option<bool>,
}

pub enum Answer {
    Choice(&'static str),
    Text(String),
    Bool(bool),
}

impl Answers {
    /// Creation mode, `Derived` until answered
    #[must_use]
    pub fn mode(&self) -> CreationMode {
        self.mode.unwrap_or(CreationMode::Derived)
    }

    /// Project kind, `Standard` until answered
    #[must_use]
    pub fn kind(&self) -> ProjectKind {
        self.kind.unwrap_or(ProjectKind::Standard)
    }

    /// Records `answer` for `field`.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if the answer has the wrong shape for the field or
    /// names a choice the field does not offer
    pub fn set(&mut self, field: Field, answer: Answer) -> Result<()> {
        match (field, answer) {
            (Field::CreationMode, Answer::Choice(v)) => {
                self.mode = Some(match v {
                    "derived" => CreationMode::Derived,
                    "explicit" => CreationMode::Explicit,
                    other => bail!("Unknown creation mode '{other}'"),
                });
            }
            (Field::ProjectKind, Answer::Choice(v)) => {
                self.kind = Some(match v {
                    "standard" => ProjectKind::Standard,
                    "custom" => ProjectKind::Custom,
                    other => bail!("Unknown project kind '{other}'"),
                });
            }
            (Field::ProjectName, Answer::Text(t)) => self.project_name = Some(t),
            (Field::CssPrefix, Answer::Text(t)) => self.css_prefix = Some(t),
            (Field::PublicPath, Answer::Text(t)) => self.public_path = Some(t),
            (Field::DevPort, Answer::Text(t)) => self.dev_port = Some(t),
            (Field::LibraryBranchA, Answer::Text(t)) => self.library_branch_a = branch(t),
            (Field::LibraryBranchB, Answer::Text(t)) => self.library_branch_b = branch(t),
            (Field::AutoInstall, Answer::Bool(b)) => self.auto_install = Some(b),
            (field, _) => return Err(anyhow!("Answer of the wrong type for {field:?}")),
        }

        Ok(())
    }

    /// Derives the remaining names and freezes the answers into a request.
    ///
    /// # Errors
    ///
    /// Returns an [`Err`] if a required answer is missing
    pub fn into_request(self) -> Result<ProvisioningRequest> {
        let (kind, mode) = (self.kind(), self.mode());
        let project_name = self.project_name.context("Missing project name")?;
        let names = match mode {
            CreationMode::Derived => naming::derive_from_name(&project_name),
            CreationMode::Explicit => naming::derive_from_explicit(
                self.css_prefix.as_deref().context("Missing css prefix")?,
                self.public_path.as_deref().context("Missing public path")?,
            ),
        };

        let mut builder = ProvisioningRequest::builder();
        builder
            .kind(kind)
            .mode(mode)
            .project_name(project_name)
            .domain(names.domain)
            .css_prefix(names.css_prefix)
            .public_path(names.public_path)
            .dev_port(self.dev_port.context("Missing dev port")?)
            .auto_install(self.auto_install.unwrap_or(true));

        if let Some(branch) = self.library_branch_a {
            builder.library_branch_a(branch);
        }
        if let Some(branch) = self.library_branch_b {
            builder.library_branch_b(branch);
        }

        Ok(builder.build()?)
    }
}

fn branch(input: String) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Runs the questionnaire and returns the frozen request.
///
/// # Errors
///
/// Returns an [`Err`] if any prompt is cancelled
pub fn collect(prompter: &mut dyn Prompter) -> Result<ProvisioningRequest> {
    let mut answers = Answers::default();

    for question in questions() {
        if !(question.when)(&answers) {
            continue;
        }

        let message = (question.message)(&answers);
        let answer = match question.ask {
            Ask::Select(choices) => {
                let index = prompter.select(&message, choices)?;
                let choice = choices
                    .get(index)
                    .ok_or_else(|| anyhow!("No option {index} for {:?}", question.field))?;
                Answer::Choice(choice.value)
            }
            Ask::Text { default, rule } => {
                let rule = rule(&answers);
                let text = prompter.text(&message, default(&answers), rule)?;
                rule.check(&text)?;
                Answer::Text(text)
            }
            Ask::Confirm { default } => Answer::Bool(prompter.confirm(&message, default)?),
        };

        answers.set(question.field, answer)?;
    }

    answers.into_request()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Feeds canned answers; invalid text answers are dropped and the next
    /// one is tried, the way a terminal prompt asks again.
    #[derive(Default)]
    struct Scripted {
        answers: VecDeque<&'static str>,
        asked: Vec<String>,
        rejected: Vec<&'static str>,
    }

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn next(&mut self) -> Result<&'static str> {
            self.answers.pop_front().context("Prompt aborted")
        }
    }

    impl Prompter for Scripted {
        fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize> {
            self.asked.push(message.into());
            let value = self.next()?;
            choices
                .iter()
                .position(|c| c.value == value)
                .context("no such choice")
        }

        fn text(&mut self, message: &str, _default: Option<&str>, rule: Rule) -> Result<String> {
            self.asked.push(message.into());
            loop {
                let value = self.next()?;
                if rule.check(value).is_ok() {
                    return Ok(value.into());
                }
                self.rejected.push(value);
            }
        }

        fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
            self.asked.push(message.into());
            Ok(self.next()? == "y")
        }
    }

    #[test]
    fn derived_standard() {
        let mut p = Scripted::new(&[
            "derived",
            "standard",
            "yst-cloudt-web-support",
            "3020",
            "",
            "  ",
            "y",
        ]);

        let req = collect(&mut p).unwrap();

        assert_eq!(req.project_name(), "yst-cloudt-web-support");
        assert_eq!(req.domain(), "support");
        assert_eq!(req.css_prefix(), "yst-support");
        assert_eq!(req.public_path(), "/support/");
        assert_eq!(req.dev_port(), "3020");
        assert_eq!(req.library_branch_a(), None);
        assert_eq!(req.library_branch_b(), None);
        assert!(req.auto_install());
        assert_eq!(p.asked.len(), 7);
    }

    #[test]
    fn explicit_custom_asks_for_prefix_and_path() {
        let mut p = Scripted::new(&[
            "explicit",
            "custom",
            "yst-lm-web-after-sale",
            "lm-as",
            "/aftersale/",
            "3100",
            "stable/3.2.x",
            "master",
            "n",
        ]);

        let req = collect(&mut p).unwrap();

        assert_eq!(req.kind(), ProjectKind::Custom);
        assert_eq!(req.mode(), CreationMode::Explicit);
        assert_eq!(req.domain(), "aftersale");
        assert_eq!(req.css_prefix(), "lm-as");
        assert_eq!(req.public_path(), "/aftersale/");
        assert_eq!(req.library_branch_a(), Some("stable/3.2.x"));
        assert_eq!(req.library_branch_b(), Some("master"));
        assert!(!req.auto_install());
        assert_eq!(p.asked.len(), 9);
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let mut p = Scripted::new(&[
            "derived",
            "standard",
            "yst-cloudt-web-after-sale",
            "yst-lm-web-support",
            "yst-cloudt-web-mes",
            "",
            "abc",
            "3020",
            "",
            "",
            "y",
        ]);

        let req = collect(&mut p).unwrap();

        assert_eq!(req.project_name(), "yst-cloudt-web-mes");
        assert_eq!(
            p.rejected,
            vec!["yst-cloudt-web-after-sale", "yst-lm-web-support", "", "abc"]
        );
    }

    #[test]
    fn name_rule_depends_on_kind_and_mode() {
        // Accepted for explicit mode, rejected for derived.
        let mut p = Scripted::new(&[
            "explicit",
            "standard",
            "yst-cloudt-web-after-sale",
            "yst-as",
            "/s/",
            "/as/",
            "3020",
            "",
            "",
            "y",
        ]);

        let req = collect(&mut p).unwrap();

        assert_eq!(req.project_name(), "yst-cloudt-web-after-sale");
        assert_eq!(req.domain(), "as");
        assert_eq!(p.rejected, vec!["/s/"]);
    }

    #[test]
    fn cancelled_prompt_aborts() {
        let mut p = Scripted::new(&["derived", "standard"]);
        assert!(collect(&mut p).is_err());
    }

    #[test]
    fn wrong_answer_shape_is_rejected() {
        let mut answers = Answers::default();
        assert!(answers.set(Field::DevPort, Answer::Bool(true)).is_err());
    }

    #[test]
    fn unknown_choice_is_rejected() {
        let mut answers = Answers::default();
        assert!(answers
            .set(Field::CreationMode, Answer::Choice("guessed"))
            .is_err());
        assert!(answers.set(Field::ProjectKind, Answer::Choice("other")).is_err());
        assert!(answers.mode.is_none() && answers.kind.is_none());

        answers
            .set(Field::ProjectKind, Answer::Choice("custom"))
            .unwrap();
        assert_eq!(answers.kind(), ProjectKind::Custom);
    }

    #[test]
    fn kind_and_mode_precede_name() {
        let order = questions().iter().map(|q| q.field).collect::<Vec<_>>();
        let name = order.iter().position(|f| *f == Field::ProjectName).unwrap();
        let kind = order.iter().position(|f| *f == Field::ProjectKind).unwrap();
        let mode = order.iter().position(|f| *f == Field::CreationMode).unwrap();
        assert!(kind < name && mode < name);
    }
}
