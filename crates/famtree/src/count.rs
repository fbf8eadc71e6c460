//! Family size aggregate

use crate::person::Person;

/// Count the members of a family for the overview screen.
///
/// Each person counts once, a spouse counts once without looking inside
/// it, and every child subtree is counted recursively. Anything the spouse
/// itself holds is left out.
pub fn count_members(person: Option<&Person>) -> usize {
    let Some(person) = person else {
        return 0;
    };
    1 + usize::from(person.spouse.is_some())
        + person
            .children()
            .iter()
            .map(|child| count_members(Some(child)))
            .sum::<usize>()
}
