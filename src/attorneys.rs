//! Attorney directory
//!
//! Static keyed table of attorney biography data. The interaction core only
//! consumes it to populate card components; an unknown name key is a silent
//! no-op, never an error.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Biography record for one attorney card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttorneyRecord {
    pub specialties: Vec<String>,
    pub education: Vec<String>,
    pub memberships: Vec<String>,
    pub admissions: Vec<String>,
    pub biography: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The static attorney directory, keyed by display name.
pub fn directory() -> &'static BTreeMap<&'static str, AttorneyRecord> {
    static DIRECTORY: OnceLock<BTreeMap<&'static str, AttorneyRecord>> = OnceLock::new();
    DIRECTORY.get_or_init(|| {
        let mut table = BTreeMap::new();
        table.insert(
            "Brett S. Carson",
            AttorneyRecord {
                specialties: strings(&[
                    "Estate Plans",
                    "Real Estate",
                    "Business Law",
                    "Elder Law",
                    "Conservatorships",
                    "Guardianships",
                    "Personal Injury",
                ]),
                education: strings(&[
                    "B.S., Colorado College and University of Oregon (1976)",
                    "J.D., cum laude, Gonzaga University (1979)",
                ]),
                memberships: strings(&[
                    "Multnomah County Bar Association",
                    "Oregon State Bar",
                    "Realtors Joint Committee (1991-1993): Real Estate, Land Use, Business, \
                     Corporate and Debtor-Creditor Sections",
                ]),
                admissions: strings(&[
                    "Oregon and U.S. District Court, District of Oregon (1979)",
                ]),
                biography: "Director, Oregon State Council for Senior Citizens, 1989-1999. \
                            Multnomah Bar Association Senior Law Project Volunteer of the Year, \
                            1986 & 2004; NE Family YMCA Board of Directors, 1986-1989; Hollywood \
                            Booster Board of Directors, 1986-2000; Hollywood Booster President, \
                            1988; Hollywood Senior Center Board of Directors, 1986-2002; \
                            President, Hollywood Senior Center, 1993-1995; Lincoln High School \
                            Freshman Basketball coach, 1998-2003; Benson High School Assistant \
                            Varsity Basketball coach, 2003-present."
                    .to_string(),
            },
        );
        table.insert(
            "Randall H. Baker",
            AttorneyRecord {
                specialties: strings(&[
                    "Litigation",
                    "Collections",
                    "Business Law",
                    "Family Law",
                    "Real Estate",
                    "Personal Injury",
                ]),
                education: strings(&[
                    "B.A., Economics, Lewis and Clark College (1981)",
                    "J.D., University of Oregon (1990)",
                ]),
                memberships: strings(&[
                    "Multnomah County and Washington State Bar Associations",
                    "Oregon State Bar",
                ]),
                admissions: strings(&[
                    "Oregon (1991)",
                    "Washington (1992)",
                    "U.S. District Court (1993)",
                    "District of Oregon",
                ]),
                biography: "Managing Board Editor, University of Oregon Law Review (1989-1990)."
                    .to_string(),
            },
        );
        table
    })
}

/// Look up a record by name key. Absent keys are the caller's cue to skip
/// population.
pub fn lookup(name: &str) -> Option<&'static AttorneyRecord> {
    directory().get(name)
}
