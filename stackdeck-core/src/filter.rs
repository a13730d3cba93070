use crate::model::ProjectSummary;

/// Free-text narrowing of the project list.
///
/// `active` means the user is still typing; a non-empty `text` keeps the list
/// narrowed after typing ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub active: bool,
    pub text: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.active = true;
        self.text.clear();
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    /// Remove the last character. Returns false when there was nothing to remove.
    pub fn pop(&mut self) -> bool {
        self.text.pop().is_some()
    }

    /// Stop typing but keep the text.
    pub fn confirm(&mut self) {
        self.active = false;
    }

    /// Stop typing and drop the text.
    pub fn cancel(&mut self) {
        self.active = false;
        self.text.clear();
    }

    pub fn is_narrowing(&self) -> bool {
        !self.text.is_empty()
    }

    /// Case-insensitive substring match on name, type, or status.
    pub fn matches(&self, project: &ProjectSummary) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        project.name.to_lowercase().contains(&needle)
            || project.project_type.to_lowercase().contains(&needle)
            || project.status.label().contains(&needle)
    }

    pub fn apply<'a>(&self, projects: &'a [ProjectSummary]) -> Vec<&'a ProjectSummary> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectStatus;

    fn project(name: &str, ty: &str, status: ProjectStatus) -> ProjectSummary {
        ProjectSummary {
            name: name.into(),
            status,
            project_type: ty.into(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<ProjectSummary> {
        vec![
            project("shop", "drupal10", ProjectStatus::Running),
            project("Blog", "wordpress", ProjectStatus::Stopped),
            project("api", "laravel", ProjectStatus::Paused),
        ]
    }

    fn names(list: Vec<&ProjectSummary>) -> Vec<String> {
        list.into_iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let projects = sample();
        assert_eq!(FilterState::new().apply(&projects).len(), 3);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let projects = sample();
        let filter = FilterState {
            active: false,
            text: "bLoG".into(),
        };
        assert_eq!(names(filter.apply(&projects)), vec!["Blog"]);
    }

    #[test]
    fn test_filter_matches_type_and_status() {
        let projects = sample();
        let by_type = FilterState {
            active: false,
            text: "LARAVEL".into(),
        };
        assert_eq!(names(by_type.apply(&projects)), vec!["api"]);

        let by_status = FilterState {
            active: false,
            text: "running".into(),
        };
        assert_eq!(names(by_status.apply(&projects)), vec!["shop"]);
    }

    #[test]
    fn test_filter_no_match_leaves_source_untouched() {
        let projects = sample();
        let filter = FilterState {
            active: true,
            text: "zzz".into(),
        };
        assert!(filter.apply(&projects).is_empty());
        assert_eq!(projects.len(), 3);
    }

    #[test]
    fn test_begin_confirm_cancel() {
        let mut filter = FilterState::new();
        filter.begin();
        filter.push('a');
        filter.push('b');
        assert!(filter.pop());
        filter.confirm();
        assert!(!filter.active);
        assert_eq!(filter.text, "a");

        filter.cancel();
        assert!(filter.text.is_empty());
        assert!(!filter.pop());
    }
}
