use crate::error::ProgressError;
use ratatui::style::Color;
use std::fmt;

// ============================================================
// Subject
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Physics,
    Chemistry,
    Maths,
    Biology,
}

impl Subject {
    /// Fixed display and aggregation order.
    pub const ALL: [Subject; 4] = [
        Subject::Physics,
        Subject::Chemistry,
        Subject::Maths,
        Subject::Biology,
    ];

    /// Name as it appears in catalog documents and completion keys.
    pub fn name(&self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Maths => "Maths",
            Subject::Biology => "Biology",
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Subject::Physics => 'P',
            Subject::Chemistry => 'C',
            Subject::Maths => 'M',
            Subject::Biology => 'B',
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Subject::ALL.into_iter().find(|subject| subject.name() == s)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================
// Combo
// ============================================================

/// Subject stream selecting which subjects are shown and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combo {
    #[default]
    Pcmb,
    Pcm,
    Pcb,
    Pc,
}

impl Combo {
    pub const ALL: [Combo; 4] = [Combo::Pcmb, Combo::Pcm, Combo::Pcb, Combo::Pc];

    pub fn code(&self) -> &'static str {
        match self {
            Combo::Pcmb => "PCMB",
            Combo::Pcm => "PCM",
            Combo::Pcb => "PCB",
            Combo::Pc => "PC",
        }
    }

    pub fn parse(code: &str) -> Result<Self, ProgressError> {
        let wanted = code.trim().to_uppercase();
        Combo::ALL
            .into_iter()
            .find(|combo| combo.code() == wanted)
            .ok_or_else(|| ProgressError::InvalidCombo(code.to_string()))
    }

    /// Letter test shared by subject visibility and aggregate inclusion.
    pub fn includes(&self, subject: Subject) -> bool {
        self.code().contains(subject.letter())
    }

    pub fn next(&self) -> Self {
        match self {
            Combo::Pcmb => Combo::Pcm,
            Combo::Pcm => Combo::Pcb,
            Combo::Pcb => Combo::Pc,
            Combo::Pc => Combo::Pcmb,
        }
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================
// Completion Key
// ============================================================

/// Composite identity of one trackable topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompletionKey<'a> {
    pub subject: Subject,
    pub chapter: &'a str,
    pub topic: &'a str,
}

impl<'a> CompletionKey<'a> {
    pub const SEPARATOR: &'static str = "||";

    pub fn new(subject: Subject, chapter: &'a str, topic: &'a str) -> Self {
        Self {
            subject,
            chapter,
            topic,
        }
    }
}

impl fmt::Display for CompletionKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.subject.name(),
            self.chapter,
            self.topic,
            sep = Self::SEPARATOR
        )
    }
}

// ============================================================
// Theme
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeName {
    Dark,
    Light,
    Solarized,
    Gruvbox,
}

impl ThemeName {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => ThemeName::Light,
            "solarized" => ThemeName::Solarized,
            "gruvbox" => ThemeName::Gruvbox,
            _ => ThemeName::Dark,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeName::Dark => ThemeName::Light,
            ThemeName::Light => ThemeName::Solarized,
            ThemeName::Solarized => ThemeName::Gruvbox,
            ThemeName::Gruvbox => ThemeName::Dark,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ThemeName::Dark => "Dark",
            ThemeName::Light => "Light",
            ThemeName::Solarized => "Solarized",
            ThemeName::Gruvbox => "Gruvbox",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub fg: Color,
    pub border: Color,
    pub border_selected: Color,
    pub title: Color,
    pub done: Color,
    pub alert: Color,
    pub header: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight_bg: Color,
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Theme {
                fg: Color::White,
                border: Color::DarkGray,
                border_selected: Color::Cyan,
                title: Color::Cyan,
                done: Color::Green,
                alert: Color::Red,
                header: Color::Cyan,
                muted: Color::DarkGray,
                accent: Color::Yellow,
                highlight_bg: Color::Rgb(40, 40, 50),
            },
            ThemeName::Light => Theme {
                fg: Color::Black,
                border: Color::Gray,
                border_selected: Color::Blue,
                title: Color::Blue,
                done: Color::Green,
                alert: Color::Red,
                header: Color::Blue,
                muted: Color::Gray,
                accent: Color::Magenta,
                highlight_bg: Color::Rgb(220, 220, 230),
            },
            ThemeName::Solarized => Theme {
                fg: Color::Rgb(131, 148, 150),
                border: Color::Rgb(88, 110, 117),
                border_selected: Color::Rgb(38, 139, 210),
                title: Color::Rgb(38, 139, 210),
                done: Color::Rgb(133, 153, 0),
                alert: Color::Rgb(220, 50, 47),
                header: Color::Rgb(38, 139, 210),
                muted: Color::Rgb(88, 110, 117),
                accent: Color::Rgb(181, 137, 0),
                highlight_bg: Color::Rgb(7, 54, 66),
            },
            ThemeName::Gruvbox => Theme {
                fg: Color::Rgb(235, 219, 178),
                border: Color::Rgb(146, 131, 116),
                border_selected: Color::Rgb(250, 189, 47),
                title: Color::Rgb(250, 189, 47),
                done: Color::Rgb(184, 187, 38),
                alert: Color::Rgb(251, 73, 52),
                header: Color::Rgb(250, 189, 47),
                muted: Color::Rgb(146, 131, 116),
                accent: Color::Rgb(254, 128, 25),
                highlight_bg: Color::Rgb(60, 56, 54),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_parse_accepts_known_codes_only() {
        assert_eq!(Combo::parse("PCMB").unwrap(), Combo::Pcmb);
        assert_eq!(Combo::parse(" pcb ").unwrap(), Combo::Pcb);
        assert_eq!(Combo::parse("PC").unwrap(), Combo::Pc);
        assert!(matches!(
            Combo::parse("PMB"),
            Err(ProgressError::InvalidCombo(code)) if code == "PMB"
        ));
        assert!(Combo::parse("").is_err());
    }

    #[test]
    fn combo_letter_test() {
        assert!(Combo::Pcm.includes(Subject::Maths));
        assert!(!Combo::Pcm.includes(Subject::Biology));
        assert!(Combo::Pcb.includes(Subject::Biology));
        assert!(!Combo::Pc.includes(Subject::Maths));
        for combo in Combo::ALL {
            assert!(combo.includes(Subject::Physics));
            assert!(combo.includes(Subject::Chemistry));
        }
    }

    #[test]
    fn combo_cycle_visits_every_code() {
        let mut combo = Combo::default();
        let mut seen = Vec::new();
        for _ in 0..Combo::ALL.len() {
            seen.push(combo);
            combo = combo.next();
        }
        assert_eq!(combo, Combo::Pcmb);
        assert_eq!(seen, Combo::ALL.to_vec());
    }

    #[test]
    fn completion_key_uses_double_pipe() {
        let key = CompletionKey::new(Subject::Physics, "Mechanics", "Kinematics");
        assert_eq!(key.to_string(), "Physics||Mechanics||Kinematics");
    }

    #[test]
    fn subject_names_round_trip() {
        for subject in Subject::ALL {
            assert_eq!(Subject::from_name(subject.name()), Some(subject));
        }
        assert_eq!(Subject::from_name("physics"), None);
    }

    #[test]
    fn theme_names_parse_case_insensitively() {
        assert_eq!(ThemeName::parse("Gruvbox"), ThemeName::Gruvbox);
        assert_eq!(ThemeName::parse("LIGHT"), ThemeName::Light);
        assert_eq!(ThemeName::parse("neon"), ThemeName::Dark);
    }
}
