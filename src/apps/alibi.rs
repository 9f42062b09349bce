//! Alibi generator.
//!
//! Picks a location in one of the selected districts, an hour from the
//! selected times of day, an activity from the selected types, and optionally
//! a witness with a phone number.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::Path;

use super::{load_data, AppAction, ContentLine, KeyInput, Tone};
use crate::core::error::ContentLoadError;
use crate::core::registry::AppId;

pub const ALIBI_FILE: &str = "alibi.json";
pub const NO_LOCATION: &str = "No suitable locations found. Please select more districts.";
const FALLBACK_ACTIVITY: &str = "doing something";

// ── Tables ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Day,
    Afternoon,
    Evening,
    Night,
    LateNight,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 6] = [
        TimeOfDay::Morning,
        TimeOfDay::Day,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
        TimeOfDay::LateNight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Day => "Day",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
            TimeOfDay::LateNight => "Late Night",
        }
    }

    /// Inclusive start and end hour.
    pub fn range(self) -> (u32, u32) {
        match self {
            TimeOfDay::Morning => (5, 8),
            TimeOfDay::Day => (9, 12),
            TimeOfDay::Afternoon => (13, 16),
            TimeOfDay::Evening => (17, 20),
            TimeOfDay::Night => (21, 0),
            TimeOfDay::LateNight => (1, 4),
        }
    }

    /// Hours covered, wrapping past midnight when the end precedes the start.
    pub fn hours(self) -> Vec<u32> {
        let (start, end) = self.range();
        let end = if end < start { end + 24 } else { end };
        (start..=end).map(|h| h % 24).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Work,
    Social,
    Food,
    Shopping,
    Leisure,
    Travel,
    MinorCrime,
    Medical,
    Legal,
    Education,
}

impl ActivityType {
    pub const ALL: [ActivityType; 10] = [
        ActivityType::Work,
        ActivityType::Social,
        ActivityType::Food,
        ActivityType::Shopping,
        ActivityType::Leisure,
        ActivityType::Travel,
        ActivityType::MinorCrime,
        ActivityType::Medical,
        ActivityType::Legal,
        ActivityType::Education,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActivityType::Work => "Work",
            ActivityType::Social => "Social",
            ActivityType::Food => "Food",
            ActivityType::Shopping => "Shopping",
            ActivityType::Leisure => "Leisure",
            ActivityType::Travel => "Travel",
            ActivityType::MinorCrime => "Minor crime",
            ActivityType::Medical => "Medical",
            ActivityType::Legal => "Legal",
            ActivityType::Education => "Education",
        }
    }

    pub fn activities(self) -> &'static [&'static str; 5] {
        match self {
            ActivityType::Work => &[
                "working a shift",
                "attending a business meeting",
                "doing overtime",
                "training a new employee",
                "fixing a work-related issue",
            ],
            ActivityType::Social => &[
                "hanging out with friends",
                "going on a date",
                "attending a party",
                "going dancing",
                "ERPing",
            ],
            ActivityType::Food => &[
                "getting food",
                "trying out a new restaurant",
                "picking up a takeout order",
                "having a quick snack",
                "meeting someone for lunch",
            ],
            ActivityType::Shopping => &[
                "buying something off Lemon List",
                "window shopping",
                "returning a purchased item",
                "browsing for new clothes",
                "picking up groceries",
            ],
            ActivityType::Leisure => &[
                "taking a leisurely walk",
                "watching a movie",
                "reading a book",
                "playing sports",
                "sightseeing",
            ],
            ActivityType::Travel => &[
                "going for a drive",
                "calling a taxi",
                "riding the bus",
                "riding my bike",
                "hitchhiking",
            ],
            ActivityType::MinorCrime => &[
                "jaywalking",
                "yelling at the employees",
                "parking in a no-parking zone",
                "littering",
                "running a red light",
            ],
            ActivityType::Medical => &[
                "getting a routine check-up",
                "picking up a prescription",
                "visiting a sick friend",
                "donating blood",
                "attending a first-aid course",
            ],
            ActivityType::Legal => &[
                "meeting with a lawyer",
                "gathering witness statements",
                "filing paperwork",
                "mailing a letter",
                "taking photos",
            ],
            ActivityType::Education => &[
                "attending a class",
                "studying for an exam",
                "participating in a workshop",
                "taking a driving test",
                "tutoring a student",
            ],
        }
    }
}

const AREA_CODE: u32 = 420;
const PREFIX_RANGES: [(u32, u32); 5] = [(310, 323), (818, 830), (588, 599), (300, 308), (960, 968)];
const LINE_RANGES: [(u32, u32); 4] = [(7865, 8000), (4315, 4370), (7125, 7255), (1785, 1844)];

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Christopher", "Nancy", "Daniel", "Lisa", "Matthew", "Betty", "Anthony",
    "Margaret", "Mark", "Sandra", "Donald", "Ashley", "Steven", "Dorothy", "Paul", "Kimberly",
    "Andrew", "Emily", "Joshua", "Donna", "Kenneth", "Michelle", "Kevin", "Carol", "Brian",
    "Amanda", "George", "Melissa", "Edward", "Deborah", "Ronald", "Stephanie", "Timothy",
    "Rebecca", "Jason", "Sharon", "Jeffrey", "Laura", "Ryan", "Cynthia", "Jacob", "Kathleen",
    "Gary", "Amy", "Nicholas", "Shirley", "Eric", "Angela", "Jonathan", "Helen", "Stephen", "Anna",
    "Larry", "Brenda", "Justin", "Pamela", "Scott", "Nicole", "Brandon", "Emma", "Benjamin",
    "Samantha", "Samuel", "Katherine", "Gregory", "Christine", "Frank", "Debra", "Alexander",
    "Rachel", "Raymond", "Catherine", "Patrick", "Carolyn", "Jack", "Janet", "Dennis", "Ruth",
    "Jerry", "Maria",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright", "Scott",
    "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall", "Rivera",
    "Campbell", "Mitchell", "Carter", "Roberts", "Gomez", "Phillips", "Evans", "Turner", "Diaz",
    "Parker", "Cruz", "Edwards", "Collins", "Reyes", "Stewart", "Morris", "Morales", "Murphy",
    "Cook", "Rogers", "Gutierrez", "Ortiz", "Morgan", "Cooper", "Peterson", "Bailey", "Reed",
    "Kelly", "Howard", "Ramos", "Kim", "Cox", "Ward", "Richardson", "Watson", "Brooks", "Chavez",
    "Wood", "James", "Bennett", "Gray", "Mendoza", "Ruiz", "Hughes", "Price", "Alvarez",
    "Castillo", "Sanders", "Patel", "Myers", "Long", "Ross", "Foster", "Jimenez", "Powell",
    "Jenkins", "Perry", "Russell", "Sullivan",
];

// ── Data ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub name: String,
    pub area: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlibiData {
    pub districts: Vec<String>,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlibiOptions {
    pub districts: Vec<String>,
    pub times: Vec<TimeOfDay>,
    pub activities: Vec<ActivityType>,
    pub witness: bool,
}

impl AlibiOptions {
    /// Everything selected, as the form starts out.
    pub fn all(data: &AlibiData) -> Self {
        Self {
            districts: data.districts.clone(),
            times: TimeOfDay::ALL.to_vec(),
            activities: ActivityType::ALL.to_vec(),
            witness: true,
        }
    }
}

fn pick_in<R: Rng>(rng: &mut R, ranges: &[(u32, u32)]) -> u32 {
    let (lo, hi) = ranges.choose(rng).copied().unwrap_or((0, 0));
    rng.gen_range(lo..=hi)
}

pub fn phone_number<R: Rng>(rng: &mut R) -> String {
    let prefix = pick_in(rng, &PREFIX_RANGES);
    let line = pick_in(rng, &LINE_RANGES);
    format!("({AREA_CODE}) {prefix}-{line:04}")
}

pub fn witness_name<R: Rng>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("John");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
    format!("{first} {last}")
}

/// `HH:MM` drawn from the union of the selected ranges; all ranges if none are.
pub fn random_time<R: Rng>(rng: &mut R, times: &[TimeOfDay]) -> String {
    let times = if times.is_empty() { &TimeOfDay::ALL[..] } else { times };
    let hours: Vec<u32> = times.iter().flat_map(|t| t.hours()).collect();
    let hour = hours.choose(rng).copied().unwrap_or(0);
    let minute = rng.gen_range(0..60);
    format!("{hour:02}:{minute:02}")
}

pub fn generate<R: Rng>(rng: &mut R, data: &AlibiData, opts: &AlibiOptions) -> String {
    let candidates: Vec<&Location> = data
        .locations
        .iter()
        .filter(|l| opts.districts.iter().any(|d| l.area.contains(d.as_str())))
        .collect();
    let Some(location) = candidates.choose(rng) else {
        return NO_LOCATION.to_string();
    };

    let activity = opts
        .activities
        .choose(rng)
        .and_then(|t| t.activities().choose(rng).copied())
        .unwrap_or(FALLBACK_ACTIVITY);
    let time = random_time(rng, &opts.times);

    let mut out = format!(
        "\"At {time}, I was at {} ({}), {activity}.\"",
        location.name, location.area
    );
    if opts.witness {
        let name = witness_name(rng);
        let phone = phone_number(rng);
        out.push_str(&format!("\nWitness: {name} - {phone}"));
    }
    out
}

// ── Window state ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    District(usize),
    Time(usize),
    Witness,
    Activity(usize),
    Generate,
}

pub struct AlibiApp {
    data: AlibiData,
    district_on: Vec<bool>,
    time_on: [bool; 6],
    activity_on: [bool; 10],
    witness: bool,
    cursor: usize,
    result: Option<String>,
    rng: StdRng,
}

impl std::fmt::Debug for AlibiApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlibiApp")
            .field("districts", &self.data.districts.len())
            .field("locations", &self.data.locations.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl AlibiApp {
    pub fn load(data_dir: &Path, app_id: &AppId) -> Result<Self, ContentLoadError> {
        let data: AlibiData = load_data(data_dir, ALIBI_FILE, app_id)?;
        log::debug!(
            "{app_id}: {} districts, {} locations",
            data.districts.len(),
            data.locations.len()
        );
        Ok(Self::with_rng(data, StdRng::from_entropy()))
    }

    pub fn with_rng(data: AlibiData, rng: StdRng) -> Self {
        let district_on = vec![true; data.districts.len()];
        Self {
            data,
            district_on,
            time_on: [true; 6],
            activity_on: [true; 10],
            witness: true,
            cursor: 0,
            result: None,
            rng,
        }
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    fn rows(&self) -> Vec<Row> {
        let mut rows: Vec<Row> = (0..self.data.districts.len()).map(Row::District).collect();
        rows.extend((0..TimeOfDay::ALL.len()).map(Row::Time));
        rows.push(Row::Witness);
        rows.extend((0..ActivityType::ALL.len()).map(Row::Activity));
        rows.push(Row::Generate);
        rows
    }

    pub fn options(&self) -> AlibiOptions {
        AlibiOptions {
            districts: self
                .data
                .districts
                .iter()
                .zip(&self.district_on)
                .filter(|(_, on)| **on)
                .map(|(d, _)| d.clone())
                .collect(),
            times: TimeOfDay::ALL
                .iter()
                .zip(self.time_on)
                .filter(|(_, on)| *on)
                .map(|(t, _)| *t)
                .collect(),
            activities: ActivityType::ALL
                .iter()
                .zip(self.activity_on)
                .filter(|(_, on)| *on)
                .map(|(a, _)| *a)
                .collect(),
            witness: self.witness,
        }
    }

    pub fn generate(&mut self) -> &str {
        let opts = self.options();
        self.result.insert(generate(&mut self.rng, &self.data, &opts))
    }

    fn activate(&mut self, row: Row) {
        match row {
            Row::District(i) => {
                if let Some(on) = self.district_on.get_mut(i) {
                    *on = !*on;
                }
            }
            Row::Time(i) => self.time_on[i] = !self.time_on[i],
            Row::Witness => self.witness = !self.witness,
            Row::Activity(i) => self.activity_on[i] = !self.activity_on[i],
            Row::Generate => {
                self.generate();
            }
        }
    }

    pub fn key(&mut self, key: KeyInput) -> AppAction {
        let rows = self.rows();
        match key {
            KeyInput::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Down => self.cursor = (self.cursor + 1).min(rows.len() - 1),
            KeyInput::Enter | KeyInput::Char(' ') => {
                if let Some(row) = rows.get(self.cursor).copied() {
                    self.activate(row);
                }
            }
            KeyInput::Char('g') => {
                self.generate();
            }
            _ => {}
        }
        AppAction::None
    }

    /// Rows are laid out one per line after a two-line header.
    pub fn click(&mut self, line: usize) -> AppAction {
        let rows = self.rows();
        if let Some(idx) = line.checked_sub(HEADER_LINES).filter(|i| *i < rows.len()) {
            self.cursor = idx;
            self.activate(rows[idx]);
        }
        AppAction::None
    }

    pub fn lines(&self, _width: usize) -> Vec<ContentLine> {
        let mut out = vec![
            ContentLine::heading("㊙ Generate an Alibi ㊙"),
            ContentLine::dim("Select one or more areas, times of day, and types of activity."),
        ];
        let check = |on: bool| if on { "[x]" } else { "[ ]" };
        for (i, row) in self.rows().into_iter().enumerate() {
            let text = match row {
                Row::District(d) => format!(
                    "Area      {} {}",
                    check(self.district_on[d]),
                    self.data.districts[d]
                ),
                Row::Time(t) => format!(
                    "Time      {} {}",
                    check(self.time_on[t]),
                    TimeOfDay::ALL[t].label()
                ),
                Row::Witness => format!("          {} Generate Witness?", check(self.witness)),
                Row::Activity(a) => format!(
                    "Activity  {} {}",
                    check(self.activity_on[a]),
                    ActivityType::ALL[a].label()
                ),
                Row::Generate => "[ Generate Alibi ]".to_string(),
            };
            out.push(ContentLine::choice(text, i == self.cursor));
        }
        if let Some(result) = &self.result {
            out.push(ContentLine::blank());
            let tone = if result == NO_LOCATION { Tone::Error } else { Tone::Heading };
            for line in result.lines() {
                out.push(ContentLine::new(line, tone));
            }
        }
        out
    }
}

const HEADER_LINES: usize = 2;
