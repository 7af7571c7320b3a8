//! Role and template catalog.
//!
//! The closed role enumeration, the static capabilities table, and the
//! pre-defined role compositions keyed by player count. Everything here is
//! process-wide immutable; new roles are added by extending [`Role`] and its
//! row in [`Role::capabilities`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// A player role. Wire form is SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Villager,
    Werewolf,
    Seer,
    Witch,
    Hunter,
    Idiot,
    Guard,
    Knight,
    WolfKing,
    WhiteWolfKing,
    WolfBeauty,
    SnowWolf,
    Gargoyle,
    EvilKnight,
    HiddenWolf,
}

/// Static per-role ability flags consulted by the phase machine and the
/// resolution rules. Kept as a table rather than role polymorphism so a new
/// role is one enum variant plus one row.
#[derive(Debug, Clone, Copy)]
pub struct RoleCapabilities {
    pub is_wolf: bool,
    pub is_god: bool,
    pub can_check: bool,
    pub can_save: bool,
    pub can_poison: bool,
    pub can_guard: bool,
    pub vote_weight_base: f64,
}

fn caps(is_wolf: bool, is_god: bool) -> RoleCapabilities {
    RoleCapabilities {
        is_wolf,
        is_god,
        can_check: false,
        can_save: false,
        can_poison: false,
        can_guard: false,
        vote_weight_base: 1.0,
    }
}

impl Role {
    pub fn capabilities(self) -> RoleCapabilities {
        match self {
            Role::Villager => caps(false, false),
            Role::Werewolf => caps(true, false),
            Role::Seer => RoleCapabilities {
                can_check: true,
                ..caps(false, true)
            },
            Role::Witch => RoleCapabilities {
                can_save: true,
                can_poison: true,
                ..caps(false, true)
            },
            Role::Hunter => caps(false, true),
            Role::Idiot => caps(false, true),
            Role::Guard => RoleCapabilities {
                can_guard: true,
                ..caps(false, true)
            },
            Role::Knight => caps(false, true),
            Role::WolfKing
            | Role::WhiteWolfKing
            | Role::WolfBeauty
            | Role::SnowWolf
            | Role::Gargoyle
            | Role::HiddenWolf => caps(true, false),
            Role::EvilKnight => caps(false, false),
        }
    }

    /// Whether the role belongs to the wolf faction.
    pub fn is_wolf(self) -> bool {
        self.capabilities().is_wolf
    }

    /// Whether the role is a god role (a good role with an ability).
    pub fn is_god(self) -> bool {
        self.capabilities().is_god
    }
}

/// A pre-defined role composition selectable at room creation.
#[derive(Debug, Clone, Serialize)]
pub struct GameTemplate {
    pub name: &'static str,
    /// Player counts this template is valid for.
    pub player_counts: &'static [usize],
    pub roles: BTreeMap<Role, usize>,
    pub description: &'static str,
}

impl GameTemplate {
    /// Total number of role cards in the template.
    pub fn role_total(&self) -> usize {
        self.roles.values().sum()
    }

    /// Expands the role map into a flat deck for shuffling.
    pub fn deck(&self) -> Vec<Role> {
        self.roles
            .iter()
            .flat_map(|(&role, &count)| std::iter::repeat(role).take(count))
            .collect()
    }
}

static TEMPLATES: LazyLock<Vec<GameTemplate>> = LazyLock::new(|| {
    let templates = vec![
        GameTemplate {
            name: "暗牌局6人",
            player_counts: &[6],
            roles: BTreeMap::from([
                (Role::Werewolf, 2),
                (Role::Villager, 2),
                (Role::Seer, 1),
                (Role::Guard, 1),
            ]),
            description: "6-player dark deck: two wolves against a seer and a guard.",
        },
        GameTemplate {
            name: "标准9人局",
            player_counts: &[9],
            roles: BTreeMap::from([
                (Role::Werewolf, 3),
                (Role::Villager, 3),
                (Role::Seer, 1),
                (Role::Witch, 1),
                (Role::Hunter, 1),
            ]),
            description: "Standard 9-player setup: three wolves, three gods.",
        },
        GameTemplate {
            name: "标准12人局",
            player_counts: &[12],
            roles: BTreeMap::from([
                (Role::Werewolf, 4),
                (Role::Villager, 4),
                (Role::Seer, 1),
                (Role::Witch, 1),
                (Role::Hunter, 1),
                (Role::Idiot, 1),
            ]),
            description: "Standard 12-player setup: four wolves, four gods.",
        },
    ];
    for template in &templates {
        for &count in template.player_counts {
            assert_eq!(
                template.role_total(),
                count,
                "template `{}` role counts do not sum to {count}",
                template.name
            );
        }
    }
    templates
});

/// All built-in templates.
pub fn list_templates() -> &'static [GameTemplate] {
    &TEMPLATES
}

/// Looks up a template by its exact name.
pub fn template_by_name(name: &str) -> Option<&'static GameTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}
