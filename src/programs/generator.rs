//! Weekly weightlifting program rules.
//!
//! A program is the four-week base plan for the lifter's experience followed
//! by one line for their goal. Unknown experience values have no base plan
//! and unknown goals add no line; neither is an error.

use crate::profile::{Experience, Goal};

const BEGINNER_PLAN: [&str; 4] = [
    "Week 1: Basic technique drills and light lifts",
    "Week 2: Increase weight gradually; focus on squats and cleans",
    "Week 3: Add snatch practice and overhead presses",
    "Week 4: Combine all lifts with moderate intensity",
];

const INTERMEDIATE_PLAN: [&str; 4] = [
    "Week 1: Heavy back squats and snatch drills",
    "Week 2: Work on clean & jerk variations",
    "Week 3: Emphasize volume with moderate intensity",
    "Week 4: Perform mock competition lifts with increased intensity",
];

const ADVANCED_PLAN: [&str; 4] = [
    "Week 1: High-intensity max-out sessions",
    "Week 2: Rest and recovery-focused drills",
    "Week 3: Combine volume with heavy lifts",
    "Week 4: Peak with a mock competition or PR day",
];

/// The four weekly lines for an experience level, in order.
pub fn base_plan(experience: &Experience) -> &'static [&'static str] {
    match experience {
        Experience::Beginner => &BEGINNER_PLAN,
        Experience::Intermediate => &INTERMEDIATE_PLAN,
        Experience::Advanced => &ADVANCED_PLAN,
        Experience::Other(_) => &[],
    }
}

/// The line appended for a goal.
pub fn goal_focus(goal: &Goal) -> Option<&'static str> {
    match goal {
        Goal::Strength => Some("Add extra squats and deadlift variations each week."),
        Goal::Technique => Some("Focus on lower weights and perfecting form."),
        Goal::Endurance => Some("Include circuit training with Olympic lifts."),
        Goal::Other(_) => None,
    }
}

/// Build the instruction lines for a profile.
pub fn generate(experience: &Experience, goals: &Goal) -> Vec<String> {
    base_plan(experience)
        .iter()
        .copied()
        .chain(goal_focus(goals))
        .map(str::to_string)
        .collect()
}
