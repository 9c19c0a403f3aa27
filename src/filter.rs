use crate::models::{Club, Dataset, EngagementBucket, FilterState, Student};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterField {
    Search(String),
    Category(Option<crate::models::ClubCategory>),
    Year(Option<crate::models::ClassYear>),
    Engagement(Option<EngagementBucket>),
}

impl FilterState {
    pub fn apply(&mut self, field: FilterField) {
        match field {
            FilterField::Search(text) => self.search = text,
            FilterField::Category(category) => self.category = category,
            FilterField::Year(year) => self.year = year,
            FilterField::Engagement(bucket) => self.engagement = bucket,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.category.is_none()
            && self.year.is_none()
            && self.engagement.is_none()
    }

    fn search_needle(&self) -> Option<String> {
        let needle = self.search.trim();
        if needle.is_empty() {
            None
        } else {
            Some(needle.to_lowercase())
        }
    }

    pub fn matches_club(&self, club: &Club) -> bool {
        let matches_search = self
            .search_needle()
            .map_or(true, |needle| club.name.to_lowercase().contains(&needle));
        let matches_category = self.category.map_or(true, |c| club.category == c);
        matches_search && matches_category
    }

    pub fn matches_student(&self, student: &Student) -> bool {
        let matches_search = self.search_needle().map_or(true, |needle| {
            student.name.to_lowercase().contains(&needle)
                || student.major.to_lowercase().contains(&needle)
        });
        let matches_year = self.year.map_or(true, |y| student.year == y);
        let matches_engagement = self
            .engagement
            .map_or(true, |bucket| EngagementBucket::of(student.engagement) == bucket);
        matches_search && matches_year && matches_engagement
    }
}

pub fn filtered_clubs(data: &Dataset, filters: &FilterState) -> Vec<Club> {
    data.clubs
        .iter()
        .filter(|c| filters.matches_club(c))
        .cloned()
        .collect()
}

pub fn filtered_students(data: &Dataset, filters: &FilterState) -> Vec<Student> {
    data.students
        .iter()
        .filter(|s| filters.matches_student(s))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::fixtures::*;
    use crate::models::{ClassYear, ClubCategory};

    #[test]
    fn empty_filters_pass_everything() {
        let data = two_clubs();
        let filters = FilterState::default();
        assert!(filters.is_empty());
        assert_eq!(filtered_clubs(&data, &filters).len(), 2);
        assert_eq!(filtered_students(&data, &filters).len(), 5);
    }

    #[test]
    fn search_is_case_insensitive_and_covers_major() {
        let mut data = two_clubs();
        data.students[0].major = "Computer Science".to_string();
        let filters = FilterState {
            search: "SCIENCE".to_string(),
            ..FilterState::default()
        };
        let hits = filtered_students(&data, &filters);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "s1");

        let clubs = filtered_clubs(
            &data,
            &FilterState {
                search: "club a".to_string(),
                ..FilterState::default()
            },
        );
        assert_eq!(clubs.len(), 1);
    }

    #[test]
    fn predicates_are_and_combined() {
        let mut data = two_clubs();
        data.students[1].year = ClassYear::Senior;
        let mut filters = FilterState::default();
        filters.apply(FilterField::Year(Some(ClassYear::Junior)));
        filters.apply(FilterField::Engagement(Some(EngagementBucket::Medium)));
        let ids: Vec<String> = filtered_students(&data, &filters)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["s4"]);

        filters.apply(FilterField::Category(Some(ClubCategory::Sports)));
        assert_eq!(filtered_clubs(&data, &filters)[0].id, "B");
    }
}
