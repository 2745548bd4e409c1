//! Read media descriptions aloud through the host text-to-speech command.
//!
//! One utterance at a time; starting another stops the current one. The "playing" marker is
//! cleared once the child process exits.

use std::process::{Child, Command, Stdio};

fn speech_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak"
    }
}

#[derive(Default)]
pub struct Speech {
    child: Option<Child>,
    /// Key of the item being read, chosen by the caller.
    playing: Option<String>,
}

impl Speech {
    pub fn playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }

    pub fn speak(&mut self, key: String, text: &str) -> anyhow::Result<()> {
        self.stop();
        let child = Command::new(speech_command())
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| anyhow::anyhow!("failed to start {}: {}", speech_command(), e))?;
        log::debug!("speech: reading {}", key);
        self.child = Some(child);
        self.playing = Some(key);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.playing = None;
    }

    /// Clear the marker when the utterance finished. Call each frame.
    pub fn poll(&mut self) {
        if let Some(ref mut child) = self.child {
            if child.try_wait().ok().flatten().is_some() {
                self.child = None;
                self.playing = None;
            }
        }
    }
}

impl Drop for Speech {
    fn drop(&mut self) {
        self.stop();
    }
}
