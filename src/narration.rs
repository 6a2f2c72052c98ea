use std::process::{Child, Command, Stdio};

use log::{debug, warn};

/// Speaks the word being practised.
pub trait Narrator {
    fn speak(&mut self, word: &str);
    fn cancel(&mut self);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn speak(&mut self, _word: &str) {}
    fn cancel(&mut self) {}
}

/// Runs an external text-to-speech program with the word as its last
/// argument. Only one utterance is ever in flight.
pub struct CommandNarrator {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandNarrator {
    /// Split a command line such as `espeak -s 140` on whitespace. Returns
    /// `None` for a blank command.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            child: None,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build(&self, word: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(word)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Narrator for CommandNarrator {
    fn speak(&mut self, word: &str) {
        self.cancel();
        match self.build(word).spawn() {
            Ok(child) => {
                debug!("narrating '{word}' with {}", self.program);
                self.child = Some(child);
            }
            Err(e) => warn!("could not run narration command {}: {e}", self.program),
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Ok(None) = child.try_wait()
        {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for CommandNarrator {
    fn drop(&mut self) {
        self.cancel();
    }
}
