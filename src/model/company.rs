//! Company record

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{record, Address, Person, RecordKind};
use crate::engine::{Composite, CompositeDescriptor};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded: Option<NaiveDate>,
    pub headquarters: Address,
    pub employees: Vec<Person>,
    /// Department name to employee names
    pub departments: HashMap<String, Vec<String>>,
    /// Revenue per quarter, in cents
    pub quarterly_revenue: [i64; 4],
}

impl Company {
    pub fn new(name: impl Into<String>, headquarters: Address) -> Self {
        Self {
            name: name.into(),
            headquarters,
            ..Self::default()
        }
    }

    pub fn hire(&mut self, person: Person, department: &str) {
        self.departments
            .entry(department.to_string())
            .or_default()
            .push(person.name.clone());
        self.employees.push(person);
    }

    pub fn employee(&self, name: &str) -> Option<&Person> {
        self.employees.iter().find(|p| p.name == name)
    }

    pub fn annual_revenue(&self) -> i64 {
        self.quarterly_revenue.iter().sum()
    }
}

impl Composite for Company {
    fn descriptor() -> &'static CompositeDescriptor {
        static DESCRIPTOR: OnceLock<CompositeDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            CompositeDescriptor::builder::<Company>()
                .constructor(Company::default)
                .member("name", |c| &c.name, |c| &mut c.name)
                .optional("founded", |c| &c.founded, |c| &mut c.founded)
                .member("headquarters", |c| &c.headquarters, |c| &mut c.headquarters)
                .member("employees", |c| &c.employees, |c| &mut c.employees)
                .member("departments", |c| &c.departments, |c| &mut c.departments)
                .member(
                    "quarterly_revenue",
                    |c| &c.quarterly_revenue,
                    |c| &mut c.quarterly_revenue,
                )
                .build()
        })
    }
}

record!(Company, RecordKind::Company);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{self, NodeKind};
    use crate::model::Record;

    fn acme() -> Company {
        let mut company = Company::new("Acme", Address::new("Hauptplatz 1", "Linz", "4020"));
        company.hire(Person::new("Ann", 30), "engineering");
        company.hire(Person::new("Bob", 41), "sales");
        company.quarterly_revenue = [100, 200, 300, 400];
        company
    }

    #[test]
    fn members_classify_by_shape() {
        let desc = Company::descriptor();
        let kind = |name| desc.member(name).map(|m| m.kind());

        assert_eq!(kind("headquarters"), Some(NodeKind::Composite));
        assert_eq!(kind("employees"), Some(NodeKind::Sequence));
        assert_eq!(kind("departments"), Some(NodeKind::Mapping));
        assert_eq!(kind("quarterly_revenue"), Some(NodeKind::Array));
        assert_eq!(kind("founded"), Some(NodeKind::LeafValue));
    }

    #[test]
    fn deep_copy_round_trips() {
        let company = acme();
        let copy = company.duplicate().unwrap();

        assert_eq!(copy, company);
        assert_eq!(copy.annual_revenue(), 1000);
        assert_ne!(copy.employees.as_ptr(), company.employees.as_ptr());
    }

    #[test]
    fn update_merges_employees_in_place() {
        let mut target = acme();
        let buffer = target.employees.as_ptr();

        let mut source = acme();
        source.employees[0].age = 31;
        source.quarterly_revenue[3] = 450;
        source.departments.remove("sales");

        let summary = engine::Engine::default()
            .merge_report(&source, &mut target)
            .unwrap();

        assert_eq!(target, source);
        assert_eq!(target.employees.as_ptr(), buffer);
        assert!(summary.changed.contains(&"employees[0].age".to_string()));
        assert!(summary.changed.contains(&"quarterly_revenue[3]".to_string()));
        assert!(summary.changed.contains(&"departments[\"sales\"]".to_string()));
    }

    #[test]
    fn lookup_and_revenue_helpers() {
        let company = acme();
        assert_eq!(company.employee("Bob").map(|p| p.age), Some(41));
        assert!(company.employee("Eve").is_none());
        assert_eq!(
            company.departments.get("engineering"),
            Some(&vec!["Ann".to_string()])
        );
    }
}
