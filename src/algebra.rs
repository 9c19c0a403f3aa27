use std::collections::HashSet;

use crate::models::{Club, Dataset, Student};

fn member_ids<'a>(data: &'a Dataset, club_id: &str) -> HashSet<&'a str> {
    data.memberships
        .iter()
        .filter(|m| m.club_id == club_id)
        .map(|m| m.student_id.as_str())
        .collect()
}

pub fn club_members(data: &Dataset, club_id: &str) -> Vec<Student> {
    let ids = member_ids(data, club_id);
    data.students
        .iter()
        .filter(|s| ids.contains(s.id.as_str()))
        .cloned()
        .collect()
}

pub fn student_clubs(data: &Dataset, student_id: &str) -> Vec<Club> {
    data.memberships
        .iter()
        .filter(|m| m.student_id == student_id)
        .filter_map(|m| data.clubs.iter().find(|c| c.id == m.club_id))
        .cloned()
        .collect()
}

pub fn intersection(data: &Dataset, club_a: &str, club_b: &str) -> Vec<Student> {
    let in_b = member_ids(data, club_b);
    club_members(data, club_a)
        .into_iter()
        .filter(|s| in_b.contains(s.id.as_str()))
        .collect()
}

pub fn union(data: &Dataset, club_a: &str, club_b: &str) -> Vec<Student> {
    let mut all = club_members(data, club_a);
    all.extend(club_members(data, club_b));
    remove_duplicates(all)
}

pub fn difference(data: &Dataset, club_a: &str, club_b: &str) -> Vec<Student> {
    let in_b = member_ids(data, club_b);
    club_members(data, club_a)
        .into_iter()
        .filter(|s| !in_b.contains(s.id.as_str()))
        .collect()
}

pub fn complement(data: &Dataset, club_ids: &[&str]) -> Vec<Student> {
    let excluded: HashSet<&str> = if club_ids.is_empty() {
        data.memberships.iter().map(|m| m.student_id.as_str()).collect()
    } else {
        club_ids
            .iter()
            .flat_map(|club_id| member_ids(data, club_id))
            .collect()
    };

    data.students
        .iter()
        .filter(|s| !excluded.contains(s.id.as_str()))
        .cloned()
        .collect()
}

pub fn remove_duplicates(students: Vec<Student>) -> Vec<Student> {
    let mut seen = HashSet::new();
    students
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .collect()
}
