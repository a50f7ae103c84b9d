use serde::{Deserialize, Serialize};

/// Loose mirrors of the upstream EarthMC JSON. The API leaves fields out
/// freely (a town without a nation, a player who never joined a town), so
/// everything defaults instead of erroring and unknown fields are ignored.

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EntityRef {
    pub name: String,
    pub uuid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Timestamps {
    pub registered: Option<i64>,
    pub joined_town_at: Option<i64>,
    pub last_online: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TownStatus {
    pub is_public: bool,
    pub is_open: bool,
    pub is_capital: bool,
    pub is_ruined: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TownStats {
    pub num_town_blocks: u32,
    pub max_town_blocks: u32,
    pub num_residents: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Town {
    pub name: String,
    pub uuid: String,
    pub board: Option<String>,
    pub mayor: Option<EntityRef>,
    pub nation: Option<EntityRef>,
    pub timestamps: Timestamps,
    pub status: TownStatus,
    pub stats: TownStats,
    pub residents: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct NationStatus {
    pub is_public: bool,
    pub is_open: bool,
    pub is_neutral: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct NationStats {
    pub num_towns: u32,
    pub num_residents: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Nation {
    pub name: String,
    pub uuid: String,
    pub board: Option<String>,
    pub king: Option<EntityRef>,
    pub capital: Option<EntityRef>,
    pub timestamps: Timestamps,
    pub status: NationStatus,
    pub stats: NationStats,
    pub towns: Vec<EntityRef>,
    pub allies: Vec<EntityRef>,
    pub enemies: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStatus {
    pub is_online: bool,
    pub is_npc: bool,
    pub is_mayor: bool,
    pub is_king: bool,
    pub has_town: bool,
    pub has_nation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStats {
    pub num_friends: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub uuid: String,
    pub title: Option<String>,
    pub surname: Option<String>,
    pub town: Option<EntityRef>,
    pub nation: Option<EntityRef>,
    pub timestamps: Timestamps,
    pub status: PlayerStatus,
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerStats {
    pub max_players: u32,
    pub num_online_players: u32,
    pub num_residents: u32,
    pub num_towns: u32,
    pub num_town_blocks: u32,
    pub num_nations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct VoteParty {
    pub target: u32,
    pub num_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    pub moon_phase: Option<String>,
    pub stats: ServerStats,
    pub vote_party: Option<VoteParty>,
}

/// Flattened card shapes the dashboard renders. Conversion is where the
/// optional-field defaults land: an absent mayor becomes "Unknown", an
/// absent nation "None", counts 0.

pub const UNKNOWN: &str = "Unknown";
pub const NONE: &str = "None";

fn ref_name(entity: Option<&EntityRef>, fallback: &str) -> String {
    match entity {
        Some(entity) if !entity.name.is_empty() => entity.name.clone(),
        _ => fallback.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TownCard {
    pub name: String,
    pub mayor: String,
    pub nation: String,
    pub residents: u32,
    pub town_blocks: u32,
    pub max_town_blocks: u32,
    pub balance: f64,
    pub is_capital: bool,
    pub is_open: bool,
    pub is_ruined: bool,
}

impl From<&Town> for TownCard {
    fn from(town: &Town) -> Self {
        Self {
            name: town.name.clone(),
            mayor: ref_name(town.mayor.as_ref(), UNKNOWN),
            nation: ref_name(town.nation.as_ref(), NONE),
            residents: town.stats.num_residents,
            town_blocks: town.stats.num_town_blocks,
            max_town_blocks: town.stats.max_town_blocks,
            balance: town.stats.balance,
            is_capital: town.status.is_capital,
            is_open: town.status.is_open,
            is_ruined: town.status.is_ruined,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NationCard {
    pub name: String,
    pub king: String,
    pub capital: String,
    pub towns: u32,
    pub residents: u32,
    pub balance: f64,
    pub is_open: bool,
    pub is_neutral: bool,
}

impl From<&Nation> for NationCard {
    fn from(nation: &Nation) -> Self {
        Self {
            name: nation.name.clone(),
            king: ref_name(nation.king.as_ref(), UNKNOWN),
            capital: ref_name(nation.capital.as_ref(), UNKNOWN),
            towns: nation.stats.num_towns,
            residents: nation.stats.num_residents,
            balance: nation.stats.balance,
            is_open: nation.status.is_open,
            is_neutral: nation.status.is_neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerCard {
    pub name: String,
    pub town: String,
    pub nation: String,
    pub is_online: bool,
    pub is_mayor: bool,
    pub is_king: bool,
    pub balance: f64,
    pub last_online: Option<i64>,
}

impl From<&Player> for PlayerCard {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            town: ref_name(player.town.as_ref(), NONE),
            nation: ref_name(player.nation.as_ref(), NONE),
            is_online: player.status.is_online,
            is_mayor: player.status.is_mayor,
            is_king: player.status.is_king,
            balance: player.stats.balance,
            last_online: player.timestamps.last_online,
        }
    }
}

/// List endpoint envelope: the filtered cards plus the section's refresh
/// state, so every screen can show its own staleness and error banner.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub refreshed_at: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SectionStatus {
    pub name: &'static str,
    pub count: usize,
    pub refreshed_at: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server: Option<ServerInfo>,
    pub sections: Vec<SectionStatus>,
}
