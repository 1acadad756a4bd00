use crate::models::Exercise;

/// Anything that can be tagged with a circuit inside a day.
pub trait CircuitMember {
    /// `None` for standalone exercises; an empty tag counts as none.
    fn circuit_id(&self) -> Option<&str>;
}

impl CircuitMember for Exercise {
    fn circuit_id(&self) -> Option<&str> {
        self.circuit_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug)]
pub struct CircuitGroup<'a, T> {
    pub id: &'a str,
    pub members: Vec<&'a T>,
}

/// Render-time partition of a day's exercises. Borrowed from the list it was
/// built from, so it cannot outlive or drift from it.
#[derive(Debug)]
pub struct CircuitGroups<'a, T> {
    /// In order of first appearance.
    pub circuits: Vec<CircuitGroup<'a, T>>,
    pub standalone: Vec<&'a T>,
}

impl<'a, T> CircuitGroups<'a, T> {
    pub fn circuit(&self, id: &str) -> Option<&CircuitGroup<'a, T>> {
        self.circuits.iter().find(|group| group.id == id)
    }
}

pub fn group_by_circuit<'a, T, I>(exercises: I) -> CircuitGroups<'a, T>
where
    T: CircuitMember + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut groups = CircuitGroups {
        circuits: Vec::new(),
        standalone: Vec::new(),
    };
    for exercise in exercises {
        match exercise.circuit_id() {
            Some(id) => match groups.circuits.iter_mut().find(|group| group.id == id) {
                Some(group) => group.members.push(exercise),
                None => groups.circuits.push(CircuitGroup {
                    id,
                    members: vec![exercise],
                }),
            },
            None => groups.standalone.push(exercise),
        }
    }
    groups
}

/// Distinct circuit ids in order of first appearance.
pub fn circuit_ids<'a, T, I>(exercises: I) -> Vec<&'a str>
where
    T: CircuitMember + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut ids: Vec<&'a str> = Vec::new();
    for id in exercises.into_iter().filter_map(|e| e.circuit_id()) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// `C<n+1>` for `n` distinct circuits, bumped past any name already taken.
pub fn next_circuit_id(existing: &[&str]) -> String {
    let mut n = existing.len() + 1;
    loop {
        let candidate = format!("C{}", n);
        if !existing.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tagged(&'static str, Option<&'static str>);

    impl CircuitMember for Tagged {
        fn circuit_id(&self) -> Option<&str> {
            self.1.filter(|id| !id.is_empty())
        }
    }

    fn assert_partition(list: &[Tagged]) {
        let groups = group_by_circuit(list);
        let mut seen: Vec<&Tagged> = groups.standalone.clone();
        for group in &groups.circuits {
            assert!(group.members.iter().all(|m| m.circuit_id() == Some(group.id)));
            seen.extend(group.members.iter().copied());
        }
        assert_eq!(seen.len(), list.len());
        for item in list {
            let expected = list.iter().filter(|other| *other == item).count();
            let found = seen.iter().filter(|other| **other == item).count();
            assert_eq!(expected, found, "{:?} lost or duplicated", item);
        }
        assert!(groups.standalone.iter().all(|m| m.circuit_id().is_none()));
    }

    #[test]
    fn partition_covers_every_exercise_exactly_once() {
        assert_partition(&[]);
        assert_partition(&[Tagged("a", None), Tagged("b", Some(""))]);
        assert_partition(&[
            Tagged("a", Some("C1")),
            Tagged("b", None),
            Tagged("c", Some("C2")),
            Tagged("d", Some("C1")),
            Tagged("a", Some("C1")),
        ]);
    }

    #[test]
    fn groups_keep_insertion_order() {
        let list = [
            Tagged("a", Some("C2")),
            Tagged("b", Some("C1")),
            Tagged("c", Some("C2")),
        ];
        let groups = group_by_circuit(&list);
        let order: Vec<_> = groups.circuits.iter().map(|g| g.id).collect();
        assert_eq!(order, vec!["C2", "C1"]);
        let members: Vec<_> = groups.circuit("C2").unwrap().members.iter().map(|m| m.0).collect();
        assert_eq!(members, vec!["a", "c"]);
    }

    #[test]
    fn next_id_counts_distinct_circuits() {
        let list = [
            Tagged("a", Some("C1")),
            Tagged("b", Some("C1")),
            Tagged("c", Some("C2")),
            Tagged("d", None),
        ];
        let ids = circuit_ids(&list);
        assert_eq!(ids, vec!["C1", "C2"]);
        assert_eq!(next_circuit_id(&ids), "C3");
        assert_eq!(next_circuit_id(&[]), "C1");
    }

    #[test]
    fn next_id_skips_names_in_use() {
        assert_eq!(next_circuit_id(&["C2"]), "C3");
        assert_eq!(next_circuit_id(&["C2", "C3"]), "C4");
    }
}
