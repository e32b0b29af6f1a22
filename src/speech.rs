use std::io;
use std::process::{Child, Command, Stdio};

use log::warn;

/// Shell line suggested (or run) by the setup-tts command.
pub const APT_INSTALL_CMD: &str = "sudo apt-get update && sudo apt-get install -y espeak-ng";

/// Spoken prompts through whatever TTS engine the platform offers.
///
/// Speaking is fire-and-forget: the engine runs as a child process so
/// the learner can start typing immediately, and `stop` cuts a prompt
/// short so prompts never overlap. A machine without any engine just
/// gets text prompts; speech failure is never fatal.
#[derive(Debug)]
pub struct Speaker {
    enabled: bool,
    locale: String,
    warned: bool,
    child: Option<Child>,
}

impl Speaker {
    pub fn new(enabled: bool, locale: &str) -> Self {
        Self {
            enabled,
            locale: locale.to_string(),
            warned: false,
            child: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Start speaking and return immediately. Any previous prompt is
    /// stopped first.
    pub fn speak(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.stop();
        self.child = self.spawn(text);
        if self.child.is_none() {
            self.warn_once();
        }
    }

    /// Speak `parts` as one utterance with short pauses between them.
    pub fn speak_parts(&mut self, parts: &[&str]) {
        let merged = parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(". ");
        self.speak(&merged);
    }

    /// Speak and block until the engine finishes. Used for greetings,
    /// not for word prompts.
    pub fn speak_and_wait(&mut self, text: &str) {
        self.speak(text);
        if let Some(child) = &mut self.child {
            let _ = child.wait();
        }
        self.child = None;
    }

    /// Stop any current speech.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if matches!(child.try_wait(), Ok(None)) {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    #[cfg(not(windows))]
    fn spawn(&self, text: &str) -> Option<Child> {
        const ENGINES: [(&str, &str); 3] = [("spd-say", "-l"), ("espeak-ng", "-v"), ("espeak", "-v")];

        for (engine, lang_flag) in ENGINES {
            match Command::new(engine)
                .arg(lang_flag)
                .arg(&self.locale)
                .arg(text)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => return Some(child),
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    warn!("{engine} failed to start: {err}");
                    return None;
                }
            }
        }
        None
    }

    #[cfg(windows)]
    fn spawn(&self, text: &str) -> Option<Child> {
        let safe = text.replace('"', "`\"");
        let culture = format!("{}-*", self.locale);
        let script = format!(
            "Add-Type -AssemblyName System.Speech; \
             $synth = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
             $voice = $synth.GetInstalledVoices() | \
             Where-Object {{ $_.VoiceInfo.Culture.Name -like '{culture}' }} | \
             Select-Object -First 1; \
             if ($voice) {{ $synth.SelectVoice($voice.VoiceInfo.Name) }}; \
             $synth.Speak(\"{safe}\");"
        );

        Command::new("powershell")
            .args(["-NoProfile", "-Command", &script])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .ok()
    }

    fn warn_once(&mut self) {
        if self.warned {
            return;
        }
        self.warned = true;
        warn!("no TTS engine found; prompts stay text-only (try: {APT_INSTALL_CMD})");
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_speaker_spawns_nothing() {
        let mut speaker = Speaker::new(false, "en");
        speaker.speak("hello");
        speaker.speak_and_wait("hello");
        assert!(speaker.child.is_none());
    }

    #[test]
    fn empty_text_is_ignored() {
        let mut speaker = Speaker::new(false, "de");
        speaker.speak("   ");
        speaker.speak_parts(&["", "  "]);
        assert!(speaker.child.is_none());
    }

    #[test]
    fn stop_without_speech_is_a_no_op() {
        let mut speaker = Speaker::new(true, "en");
        speaker.stop();
        speaker.stop();
    }

    #[test]
    fn enabled_flag_is_exposed() {
        assert!(Speaker::new(true, "en").enabled());
        assert!(!Speaker::new(false, "en").enabled());
    }
}
