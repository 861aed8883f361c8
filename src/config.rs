use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::aggregate::PROGRAM_CAPACITY;
use crate::grading::{GradeScale, Letter};

/// Which aggregate the dashboard ranks by enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    #[default]
    Course,
    Program,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    pub scale: GradeScale,
    pub histogram_sample_size: usize,
    pub ranking_sample_size: usize,
    pub top_n: usize,
    pub recent_limit: usize,
    pub program_capacity: usize,
    pub passing_letters: Vec<Letter>,
    pub rank_by: RankBy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let scale = GradeScale::default();
        Self {
            scale,
            histogram_sample_size: 1000,
            ranking_sample_size: 5000,
            top_n: 5,
            recent_limit: 5,
            program_capacity: PROGRAM_CAPACITY,
            passing_letters: scale.default_passing(),
            rank_by: RankBy::default(),
        }
    }
}

/// Engine tunables as CLI flags with environment fallbacks.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Grade band table applied to every derived view
    #[arg(
        long,
        global = true,
        env = "ACADEMIC_GRADE_SCALE",
        value_enum,
        default_value_t = GradeScale::Standard
    )]
    pub scale: GradeScale,

    /// Records sampled for the grade distribution
    #[arg(long, global = true, env = "ACADEMIC_HISTOGRAM_SAMPLE", default_value_t = 1000)]
    pub histogram_sample: usize,

    /// Records sampled for the enrollment ranking
    #[arg(long, global = true, env = "ACADEMIC_RANKING_SAMPLE", default_value_t = 5000)]
    pub ranking_sample: usize,

    #[arg(long, global = true, env = "ACADEMIC_TOP_N", default_value_t = 5)]
    pub top_n: usize,

    #[arg(long, global = true, env = "ACADEMIC_RECENT_LIMIT", default_value_t = 5)]
    pub recent_limit: usize,

    #[arg(
        long,
        global = true,
        env = "ACADEMIC_PROGRAM_CAPACITY",
        default_value_t = PROGRAM_CAPACITY
    )]
    pub program_capacity: usize,

    /// Comma-separated passing letters; defaults to the A and B families of the scale
    #[arg(
        long,
        global = true,
        env = "ACADEMIC_PASSING_LETTERS",
        value_delimiter = ','
    )]
    pub passing: Vec<Letter>,

    #[arg(
        long,
        global = true,
        env = "ACADEMIC_RANK_BY",
        value_enum,
        default_value_t = RankBy::Course
    )]
    pub rank_by: RankBy,
}

impl From<EngineArgs> for EngineConfig {
    fn from(args: EngineArgs) -> Self {
        let passing_letters = if args.passing.is_empty() {
            args.scale.default_passing()
        } else {
            args.passing
        };

        Self {
            scale: args.scale,
            histogram_sample_size: args.histogram_sample,
            ranking_sample_size: args.ranking_sample,
            top_n: args.top_n,
            recent_limit: args.recent_limit,
            program_capacity: args.program_capacity,
            passing_letters,
            rank_by: args.rank_by,
        }
    }
}
