use std::fmt::Display;

/// The word that, standing alone at the end of a command, asks for background execution.
pub const BACKGROUND_OPERATOR: &str = "&";

/// A command line split into words: the program name followed by its arguments.
///
/// Until it is handed to the launcher a command may still carry a trailing background operator
/// and redirection operators; those are removed by producing new values, never by editing a
/// command other stages still look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    words: Vec<String>,
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.words.join(" "))
    }
}

impl Command {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// The program name, if there is one.
    pub fn name(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// Everything after the program name.
    pub fn arguments(&self) -> &[String] {
        self.words.get(1..).unwrap_or_default()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Remove a trailing standalone background operator.
    ///
    /// Returns the remaining command and whether it should run in the background. The operator
    /// is consumed even when `foreground_only` is set, in which case the command runs in the
    /// foreground as if it had never been there.
    pub fn split_background(mut self, foreground_only: bool) -> (Command, bool) {
        if self.words.last().map(String::as_str) == Some(BACKGROUND_OPERATOR) {
            self.words.pop();
            (self, !foreground_only)
        } else {
            (self, false)
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Command {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
