use std::fmt;

use crate::coerce::SemanticType;
use crate::flatten::GroupSuffix;
use crate::mapping::FieldSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Player,
    Team,
}

impl Level {
    /// Name of the foreign-key column that follows `stat_id`.
    pub fn key_column(self) -> &'static str {
        match self {
            Level::Player => "player_id",
            Level::Team => "team_id",
        }
    }

    /// Source columns that identify the row rather than describe it. They are
    /// carried on the record as its identity and never emitted as metrics.
    pub fn identity_columns(self) -> &'static [&'static str] {
        match self {
            Level::Player => &["Rk", "Player", "Nation", "Pos", "Squad", "Age", "Born"],
            Level::Team => &["Squad", "# Pl", "#Pl"],
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Player => f.write_str("player"),
            Level::Team => f.write_str("team"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatKind {
    Standard,
    Goalkeeping,
    AdvancedGoalkeeping,
    Shooting,
    Passing,
    PassTypes,
    GoalShotCreation,
    Defense,
    Possession,
    PlayingTime,
    Miscellaneous,
}

impl StatKind {
    pub const ALL: [StatKind; 11] = [
        StatKind::Standard,
        StatKind::Goalkeeping,
        StatKind::AdvancedGoalkeeping,
        StatKind::Shooting,
        StatKind::Passing,
        StatKind::PassTypes,
        StatKind::GoalShotCreation,
        StatKind::Defense,
        StatKind::Possession,
        StatKind::PlayingTime,
        StatKind::Miscellaneous,
    ];

    fn player_stem(self) -> &'static str {
        match self {
            StatKind::Standard => "Standard",
            StatKind::Goalkeeping => "Keeper",
            StatKind::AdvancedGoalkeeping => "Keeper_Adv",
            StatKind::Shooting => "Shooting",
            StatKind::Passing => "Passing",
            StatKind::PassTypes => "Passing_Types",
            StatKind::GoalShotCreation => "Gca",
            StatKind::Defense => "Defense",
            StatKind::Possession => "Possession",
            StatKind::PlayingTime => "Playing_Time",
            StatKind::Miscellaneous => "Misc",
        }
    }

    fn team_stem(self) -> &'static str {
        match self {
            StatKind::Standard => "Standard_Stats",
            StatKind::Goalkeeping => "Goalkeeping",
            StatKind::AdvancedGoalkeeping => "Advanced_Goalkeeping",
            StatKind::Shooting => "Shooting",
            StatKind::Passing => "Passing",
            StatKind::PassTypes => "Pass_Types",
            StatKind::GoalShotCreation => "Goal_and_Shot_Creation",
            StatKind::Defense => "Defensive_Actions",
            StatKind::Possession => "Possession",
            StatKind::PlayingTime => "Playing_Time",
            StatKind::Miscellaneous => "Miscellaneous_Stats",
        }
    }

    fn table_stem(self) -> &'static str {
        match self {
            StatKind::Standard => "standard_stats",
            StatKind::Goalkeeping => "goalkeeping",
            StatKind::AdvancedGoalkeeping => "advanced_goalkeeping",
            StatKind::Shooting => "shooting",
            StatKind::Passing => "passing",
            StatKind::PassTypes => "pass_types",
            StatKind::GoalShotCreation => "goal_and_shot_creation",
            StatKind::Defense => "defensive_actions",
            StatKind::Possession => "possession",
            StatKind::PlayingTime => "playing_time",
            StatKind::Miscellaneous => "miscellaneous_stats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category {
    pub kind: StatKind,
    pub level: Level,
}

impl Category {
    pub const fn new(kind: StatKind, level: Level) -> Self {
        Self { kind, level }
    }

    /// All 22 categories, player variants first.
    pub fn all() -> Vec<Category> {
        [Level::Player, Level::Team]
            .into_iter()
            .flat_map(|level| StatKind::ALL.into_iter().map(move |kind| Category { kind, level }))
            .collect()
    }

    pub fn raw_file_name(self, league: &str) -> String {
        match self.level {
            Level::Player => format!("{}.csv", self.kind.player_stem()),
            Level::Team => format!("{league}_Squad_{}.csv", self.kind.team_stem()),
        }
    }

    pub fn output_file_name(self, league: &str) -> String {
        match self.level {
            Level::Player => format!("{}_cleaned.csv", self.kind.player_stem()),
            Level::Team => format!("{league}_Squad_{}_cleaned.csv", self.kind.team_stem()),
        }
    }

    pub fn sink_table(self) -> String {
        format!("{}_{}", self.level, self.kind.table_stem())
    }

    pub fn spec(self) -> CategorySpec {
        let (groups, fields) = schema(self);
        CategorySpec {
            category: self,
            groups,
            fields,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.level, self.kind.table_stem())
    }
}

/// The declarative description one generic transform runs against.
#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub category: Category,
    pub groups: &'static [GroupSuffix],
    pub fields: &'static [FieldSpec],
}

impl CategorySpec {
    /// Full output header: surrogate key, foreign key, then metrics.
    pub fn output_columns(&self) -> Vec<&'static str> {
        let mut out = Vec::with_capacity(self.fields.len() + 2);
        out.push("stat_id");
        out.push(self.category.level.key_column());
        out.extend(self.fields.iter().map(|f| f.name));
        out
    }
}

const fn int(raw: &'static str, name: &'static str) -> FieldSpec {
    FieldSpec {
        raw,
        name,
        kind: SemanticType::Int,
    }
}

const fn float(raw: &'static str, name: &'static str) -> FieldSpec {
    FieldSpec {
        raw,
        name,
        kind: SemanticType::Float,
    }
}

const fn group(group: &'static str, suffix: &'static str) -> GroupSuffix {
    GroupSuffix { group, suffix }
}

fn schema(category: Category) -> (&'static [GroupSuffix], &'static [FieldSpec]) {
    use Level::{Player, Team};
    use StatKind::*;
    match (category.kind, category.level) {
        (Standard, Player) => (&[], PLAYER_STANDARD),
        (Standard, Team) => (&[], TEAM_STANDARD),
        (Goalkeeping, Player) => (KEEPER_GROUPS, PLAYER_GOALKEEPING),
        (Goalkeeping, Team) => (KEEPER_GROUPS, TEAM_GOALKEEPING),
        (AdvancedGoalkeeping, _) => (ADV_KEEPER_GROUPS, ADVANCED_GOALKEEPING),
        (Shooting, _) => (&[], SHOOTING),
        (Passing, Player) => (PASSING_GROUPS, PLAYER_PASSING),
        (Passing, Team) => (PASSING_GROUPS, TEAM_PASSING),
        (PassTypes, _) => (&[], PASS_TYPES),
        (GoalShotCreation, _) => (GCA_GROUPS, GOAL_SHOT_CREATION),
        (Defense, _) => (DEFENSE_GROUPS, DEFENSE),
        (Possession, _) => (&[], POSSESSION),
        (PlayingTime, Player) => (&[], PLAYER_PLAYING_TIME),
        (PlayingTime, Team) => (&[], TEAM_PLAYING_TIME),
        (Miscellaneous, _) => (&[], MISCELLANEOUS),
    }
}

const PASSING_GROUPS: &[GroupSuffix] = &[
    group("Total", "_total"),
    group("Short", "_short"),
    group("Medium", "_medium"),
    group("Long", "_long"),
];
const GCA_GROUPS: &[GroupSuffix] = &[group("SCA Types", "_sca"), group("GCA Types", "_gca")];
const DEFENSE_GROUPS: &[GroupSuffix] = &[
    group("Tackles", "_tackles"),
    group("Challenges", "_challenges"),
    group("Blocks", "_blocks"),
];
const KEEPER_GROUPS: &[GroupSuffix] = &[group("Penalty Kicks", "_penalty")];
const ADV_KEEPER_GROUPS: &[GroupSuffix] = &[group("Goal Kicks", "_kicks")];

const PLAYER_STANDARD: &[FieldSpec] = &[
    int("MP", "mp"),
    int("Min", "min"),
    float("90s", "ninety_s"),
    int("Starts", "starts"),
    int("Gls", "gls"),
    float("Gls_per_90", "gls_per_90"),
    int("Ast", "ast"),
    float("Ast_per_90", "ast_per_90"),
    int("G+A", "g_a"),
    float("G+A_per_90", "g_a_per_90"),
    int("G-PK", "g_pk"),
    float("G-PK_per_90", "g_pk_per_90"),
    int("PK", "pk"),
    int("PKatt", "pkatt"),
    int("CrdY", "crd_y"),
    int("CrdR", "crd_r"),
    float("xG", "xg"),
    float("xG_per_90", "xg_per_90"),
    float("npxG", "npxg"),
    float("npxG_per_90", "npxg_per_90"),
    float("xAG", "xag"),
    float("xAG_per_90", "xag_per_90"),
    float("npxG+xAG", "npxg_xag"),
    float("npxG+xAG_per_90", "npxg_xag_per_90"),
];

const TEAM_STANDARD: &[FieldSpec] = &[
    float("Age", "age"),
    float("Poss", "poss"),
    int("MP", "mp"),
    int("Starts", "starts"),
    int("Min", "min"),
    float("90s", "ninety_s"),
    int("Gls", "gls"),
    float("Gls_per_90", "gls_per_90"),
    int("Ast", "ast"),
    float("Ast_per_90", "ast_per_90"),
    int("G+A", "g_a"),
    float("G+A_per_90", "g_a_per_90"),
    int("G-PK", "g_pk"),
    float("G-PK_per_90", "g_pk_per_90"),
    int("PK", "pk"),
    int("PKatt", "pkatt"),
    int("CrdY", "crd_y"),
    int("CrdR", "crd_r"),
    float("xG", "xg"),
    float("xG_per_90", "xg_per_90"),
    float("npxG", "npxg"),
    float("npxG_per_90", "npxg_per_90"),
    float("xAG", "xag"),
    float("xAG_per_90", "xag_per_90"),
    float("npxG+xAG", "npxg_xag"),
    float("npxG+xAG_per_90", "npxg_xag_per_90"),
];

const TEAM_GOALKEEPING: &[FieldSpec] = &[
    int("MP", "mp"),
    int("Starts", "starts"),
    int("Min", "min"),
    float("90s", "ninety_s"),
    int("GA", "ga"),
    float("GA90", "ga_per_90"),
    int("SoTA", "sota"),
    int("Saves", "saves"),
    float("Save%", "save_percent"),
    int("W", "w"),
    int("D", "d"),
    int("L", "l"),
    int("CS", "cs"),
    float("CS%", "cs_percent"),
];

const PLAYER_GOALKEEPING: &[FieldSpec] = &[
    int("MP", "mp"),
    int("Starts", "starts"),
    int("Min", "min"),
    float("90s", "ninety_s"),
    int("GA", "ga"),
    float("GA90", "ga_per_90"),
    int("SoTA", "sota"),
    int("Saves", "saves"),
    float("Save%", "save_percent"),
    int("W", "w"),
    int("D", "d"),
    int("L", "l"),
    int("CS", "cs"),
    float("CS%", "cs_percent"),
    int("PKatt_penalty", "pkatt"),
    int("PKA_penalty", "pka"),
    int("PKsv_penalty", "pk_sv"),
    int("PKm_penalty", "pk_missed"),
];

const ADVANCED_GOALKEEPING: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("GA", "ga"),
    int("PKA", "pka"),
    int("FK", "fk"),
    int("CK", "ck"),
    int("OG", "og"),
    float("PSxG", "psxg"),
    float("PSxG/SoT", "psxg_per_sot"),
    float("PSxG+/-", "psxg_plus_minus"),
    float("/90", "psxg_plus_minus_per_90"),
    int("Cmp", "cmp"),
    int("Att", "att"),
    float("Cmp%", "cmp_percent"),
    int("Att (GK)", "att_gk"),
    int("Thr", "thr"),
    float("Launch%", "launch_percent"),
    float("AvgLen", "avg_len"),
    int("Opp", "opp"),
    int("Stp", "stp"),
    float("Stp%", "stp_percent"),
    int("#OPA", "opa"),
    float("#OPA/90", "opa_per_90"),
    float("AvgDist", "avg_dist"),
];

const SHOOTING: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("Gls", "gls"),
    int("Sh", "sh"),
    int("SoT", "sot"),
    float("SoT%", "sot_percent"),
    float("Sh/90", "sh_per_90"),
    float("SoT/90", "sot_per_90"),
    float("G/Sh", "g_per_sh"),
    float("G/SoT", "g_per_sot"),
    float("Dist", "dist"),
    int("FK", "fk"),
    int("PK", "pk"),
    int("PKatt", "pkatt"),
    float("xG", "xg"),
    float("npxG", "npxg"),
    float("npxG/Sh", "npxg_per_sh"),
    float("G-xG", "g_minus_xg"),
    float("np:G-xG", "npg_minus_xg"),
];

const PLAYER_PASSING: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("Cmp_total", "cmp_total"),
    int("Att_total", "att_total"),
    float("Cmp%_total", "cmp_percent_total"),
    float("TotDist_total", "tot_dist_total"),
    float("PrgDist_total", "prg_dist_total"),
    int("Cmp_short", "cmp_short"),
    int("Att_short", "att_short"),
    float("Cmp%_short", "cmp_percent_short"),
    int("Cmp_medium", "cmp_medium"),
    int("Att_medium", "att_medium"),
    float("Cmp%_medium", "cmp_percent_medium"),
    int("Cmp_long", "cmp_long"),
    int("Att_long", "att_long"),
    float("Cmp%_long", "cmp_percent_long"),
    int("Ast", "ast"),
    float("xA", "xa"),
    float("xAG", "xag"),
    float("A-xAG", "a_xag"),
    int("KP", "kp"),
    int("1/3", "one_third_ppa"),
    int("CrsPA", "crspa"),
    int("PrgP", "prgp"),
];

const TEAM_PASSING: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("Cmp_total", "cmp_total"),
    int("Att_total", "att_total"),
    float("Cmp%_total", "cmp_percent_total"),
    float("TotDist_total", "tot_dist_total"),
    float("PrgDist_total", "prg_dist_total"),
    int("Cmp_short", "cmp_short"),
    int("Att_short", "att_short"),
    float("Cmp%_short", "cmp_percent_short"),
    int("Cmp_medium", "cmp_medium"),
    int("Att_medium", "att_medium"),
    float("Cmp%_medium", "cmp_percent_medium"),
    int("Cmp_long", "cmp_long"),
    int("Att_long", "att_long"),
    float("Cmp%_long", "cmp_percent_long"),
    int("Ast", "ast"),
    int("KP", "kp"),
    int("1/3", "one_third"),
    int("CrsPA", "crspa"),
    int("PrgP", "prgp"),
];

const PASS_TYPES: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("Att", "att"),
    int("Live", "live"),
    int("Dead", "dead"),
    int("FK", "fk"),
    int("TB", "tb"),
    int("Sw", "sw"),
    int("Crs", "crs"),
    int("TI", "ti"),
    int("CK", "ck"),
    int("In", "inn"),
    int("Out", "outt"),
    int("Str", "str"),
    int("Cmp", "cmp"),
    int("Off", "off"),
    int("Blocks", "blocks"),
];

const GOAL_SHOT_CREATION: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("SCA", "sca"),
    float("SCA90", "sca_per_90"),
    int("PassLive_sca", "passlive_sca"),
    int("PassDead_sca", "passdead_sca"),
    int("TO_sca", "to_sca"),
    int("Sh_sca", "sh_sca"),
    int("Fld_sca", "fld_sca"),
    int("Def_sca", "def_sca"),
    int("GCA", "gca"),
    float("GCA90", "gca_per_90"),
    int("PassLive_gca", "passlive_gca"),
    int("PassDead_gca", "passdead_gca"),
    int("TO_gca", "to_gca"),
    int("Sh_gca", "sh_gca"),
    int("Fld_gca", "fld_gca"),
    int("Def_gca", "def_gca"),
];

const DEFENSE: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("Tkl_tackles", "tkl_tackles"),
    int("TklW_tackles", "tklw_tackles"),
    int("Def 3rd_tackles", "def_3rd_tackles"),
    int("Mid 3rd_tackles", "mid_3rd_tackles"),
    int("Att 3rd_tackles", "att_3rd_tackles"),
    int("Tkl_challenges", "tkl_challenges"),
    int("Att_challenges", "att_challenges"),
    float("Tkl%_challenges", "tkl_percent_challenges"),
    int("Lost_challenges", "lost_challenges"),
    int("Blocks_blocks", "blocks_blocks"),
    int("Sh_blocks", "sh_blocks"),
    int("Pass_blocks", "pass_blocks"),
    int("Int", "interceptions"),
    int("Tkl+Int", "tkl_plus_int"),
    int("Clr", "clr"),
    int("Err", "err"),
];

const POSSESSION: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("Touches", "touches"),
    int("Def Pen", "def_pen"),
    int("Def 3rd", "def_3rd"),
    int("Mid 3rd", "mid_3rd"),
    int("Att 3rd", "att_3rd"),
    int("Att Pen", "att_pen"),
    int("Live", "live"),
    int("Att", "att"),
    int("Succ", "succ"),
    float("Succ%", "succ_percent"),
    int("Tkld", "tkld"),
    float("Tkld%", "tkld_percent"),
    int("Carries", "carries"),
    float("TotDist", "tot_dist"),
    float("PrgDist", "prg_dist"),
    int("PrgC", "prgc"),
    int("1/3", "one_third"),
    int("CPA", "cpa"),
    int("Mis", "mis"),
    int("Dis", "dis"),
    int("Rec", "rec"),
    int("PrgR", "prgr"),
];

const PLAYER_PLAYING_TIME: &[FieldSpec] = &[
    int("MP", "mp"),
    int("Min", "min"),
    float("90s", "ninety_s"),
    int("Starts", "starts"),
    float("Mn/Start", "mn_per_start"),
    int("Compl", "compl"),
    int("Subs", "subs"),
    float("Mn/Sub", "mn_per_subs"),
    int("unSub", "unsub"),
    float("PPM", "ppm"),
    int("onG", "on_g"),
    int("onGA", "on_ga"),
    int("+/-", "plus_minus"),
    float("+/-90", "plus_minus_per_90"),
    float("onxG", "onxg"),
    float("onxGA", "onxga"),
    float("xG+/-", "xg_plus_minus"),
    float("xG+/-90", "xg_plus_minus_per_90"),
];

const TEAM_PLAYING_TIME: &[FieldSpec] = &[
    float("Age", "age"),
    int("MP", "mp"),
    int("Min", "min"),
    float("Mn/MP", "mn_per_mp"),
    float("Min%", "min_percent"),
    float("90s", "ninety_s"),
    int("Starts", "starts"),
    float("Mn/Start", "mn_per_start"),
    int("Compl", "compl"),
    int("Subs", "subs"),
    float("Mn/Sub", "mn_per_sub"),
    int("unSub", "unsub"),
    float("PPM", "ppm"),
    int("onG", "on_g"),
    int("onGA", "on_ga"),
    int("+/-", "plus_minus"),
    float("+/-90", "plus_minus_per_90"),
    float("onxG", "onxg"),
    float("onxGA", "onxga"),
    float("xG+/-", "xg_plus_minus"),
    float("xG+/-90", "xg_plus_minus_per_90"),
];

const MISCELLANEOUS: &[FieldSpec] = &[
    float("90s", "ninety_s"),
    int("CrdY", "crd_y"),
    int("CrdR", "crd_r"),
    int("2CrdY", "two_crd_y"),
    int("Fls", "fls"),
    int("Fld", "fld"),
    int("Off", "off"),
    int("Crs", "crs"),
    int("Int", "interceptions"),
    int("TklW", "tklw"),
    int("PKwon", "pkwon"),
    int("PKcon", "pkcon"),
    int("OG", "og"),
    int("Recov", "recov"),
    int("Won", "won"),
    int("Lost", "lost"),
    float("Won%", "won_percent"),
];
