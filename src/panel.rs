use crate::catalog::Catalog;
use crate::model::Subject;

/// Topic detail sheet for one (subject, chapter) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TopicPanel {
    #[default]
    Closed,
    Open {
        subject: Subject,
        chapter: String,
        topics: Vec<String>,
        cursor: usize,
    },
}

impl TopicPanel {
    /// Replace whatever is shown with the topics of `chapter`. An unknown
    /// chapter opens with no rows.
    pub fn open(&mut self, catalog: &Catalog, subject: Subject, chapter: &str) -> &[String] {
        let topics = catalog
            .topics(subject, chapter)
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        *self = TopicPanel::Open {
            subject,
            chapter: chapter.to_string(),
            topics,
            cursor: 0,
        };
        self.topics()
    }

    pub fn close(&mut self) {
        *self = TopicPanel::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, TopicPanel::Open { .. })
    }

    pub fn topics(&self) -> &[String] {
        match self {
            TopicPanel::Open { topics, .. } => topics.as_slice(),
            TopicPanel::Closed => &[],
        }
    }

    /// Subject, chapter and topic under the cursor.
    pub fn selected(&self) -> Option<(Subject, &str, &str)> {
        match self {
            TopicPanel::Open {
                subject,
                chapter,
                topics,
                cursor,
            } => topics
                .get(*cursor)
                .map(|topic| (*subject, chapter.as_str(), topic.as_str())),
            TopicPanel::Closed => None,
        }
    }

    pub fn cursor(&self) -> usize {
        match self {
            TopicPanel::Open { cursor, .. } => *cursor,
            TopicPanel::Closed => 0,
        }
    }

    pub fn select_next(&mut self) {
        if let TopicPanel::Open { topics, cursor, .. } = self {
            if !topics.is_empty() {
                *cursor = (*cursor + 1).min(topics.len() - 1);
            }
        }
    }

    pub fn select_prev(&mut self) {
        if let TopicPanel::Open { cursor, .. } = self {
            *cursor = cursor.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{"Physics": {"Mechanics": ["Kinematics", "Laws of Motion"], "Optics": ["Lenses"]}}"#,
        )
        .unwrap()
    }

    #[test]
    fn open_replaces_topic_set() {
        let catalog = catalog();
        let mut panel = TopicPanel::default();
        assert_eq!(
            panel.open(&catalog, Subject::Physics, "Mechanics"),
            &["Kinematics".to_string(), "Laws of Motion".to_string()]
        );
        panel.select_next();
        assert_eq!(panel.cursor(), 1);

        assert_eq!(
            panel.open(&catalog, Subject::Physics, "Optics"),
            &["Lenses".to_string()]
        );
        assert_eq!(panel.cursor(), 0);
        assert_eq!(
            panel.selected(),
            Some((Subject::Physics, "Optics", "Lenses"))
        );
    }

    #[test]
    fn close_is_idempotent() {
        let catalog = catalog();
        let mut panel = TopicPanel::default();
        panel.close();
        assert_eq!(panel, TopicPanel::Closed);

        panel.open(&catalog, Subject::Physics, "Optics");
        panel.close();
        panel.close();
        assert!(!panel.is_open());
        assert!(panel.topics().is_empty());
        assert_eq!(panel.selected(), None);
    }

    #[test]
    fn unknown_chapter_opens_empty() {
        let mut panel = TopicPanel::default();
        assert!(panel
            .open(&Catalog::default(), Subject::Biology, "Cells")
            .is_empty());
        assert!(panel.is_open());
        panel.select_next();
        assert_eq!(panel.selected(), None);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let catalog = catalog();
        let mut panel = TopicPanel::default();
        panel.open(&catalog, Subject::Physics, "Mechanics");
        panel.select_prev();
        assert_eq!(panel.cursor(), 0);
        for _ in 0..5 {
            panel.select_next();
        }
        assert_eq!(panel.cursor(), 1);
    }
}
