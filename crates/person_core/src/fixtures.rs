//! Sample people used by the `seed` command and tests.

use crate::model::person::NewPerson;

/// A single person for the create-one walkthrough.
pub fn sample_person() -> NewPerson {
    NewPerson::new("Satosh")
        .with_age(19)
        .with_foods(["Chocolate", "Pankake", "Banana"])
}

/// A batch for the create-many walkthrough.
pub fn sample_people() -> Vec<NewPerson> {
    vec![
        NewPerson::new("RobotMama")
            .with_age(999)
            .with_foods(["Oil", "hydrogen", "Battery"]),
        NewPerson::new("Mario")
            .with_age(32)
            .with_foods(["Pizza", "Pasta", "Mushroom", "Star"]),
        NewPerson::new("Link").with_age(17).with_foods(["Mushroom"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::{sample_people, sample_person};

    #[test]
    fn fixtures_are_valid() {
        sample_person().validate().unwrap();
        for person in sample_people() {
            person.validate().unwrap();
        }
    }
}
