use std::fmt;

use crate::models::Friend;

/// Where a friend currently is, as reported by the friends list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendLocation {
    Offline,
    Private,
    Traveling,
    Instance(InstanceRef),
}

impl FriendLocation {
    /// Parse the wire `location` field. Returns `None` for descriptors
    /// that match none of the known forms.
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "offline" => Some(Self::Offline),
            "private" => Some(Self::Private),
            "traveling" => Some(Self::Traveling),
            _ => InstanceRef::parse(location).map(Self::Instance),
        }
    }
}

/// A world instance reference of the form
/// `wrld_<uuid>:<digits>[~modifier(args)...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub world_id: String,
    pub instance_id: String,
    pub access: InstanceAccess,
}

impl InstanceRef {
    pub fn parse(descriptor: &str) -> Option<Self> {
        let (world_id, rest) = descriptor.split_once(':')?;
        if !is_world_id(world_id) {
            return None;
        }

        let (instance_id, modifiers) = match rest.split_once('~') {
            Some((id, modifiers)) => (id, Some(modifiers)),
            None => (rest, None),
        };
        if instance_id.is_empty() || !instance_id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let access = modifiers.map_or(InstanceAccess::Public, InstanceAccess::from_modifiers);
        Some(Self {
            world_id: world_id.to_string(),
            instance_id: instance_id.to_string(),
            access,
        })
    }
}

fn is_world_id(id: &str) -> bool {
    let Some(uuid) = id.strip_prefix("wrld_") else {
        return false;
    };
    uuid.len() == 36
        && uuid.char_indices().all(|(index, c)| match index {
            8 | 13 | 18 | 23 => c == '-',
            _ => matches!(c, '0'..='9' | 'a'..='f'),
        })
}

/// Access level of an instance, inferred from its descriptor modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAccess {
    /// No recognized modifier
    Public,
    /// `~hidden`, shown upstream as "friends of friends"
    FriendsPlus,
    /// `~friends`
    Friends,
    /// `~group`
    Group,
}

impl InstanceAccess {
    fn from_modifiers(modifiers: &str) -> Self {
        for modifier in modifiers.split('~') {
            let name = modifier.split('(').next().unwrap_or(modifier);
            match name {
                "hidden" => return Self::FriendsPlus,
                "friends" => return Self::Friends,
                "group" => return Self::Group,
                _ => {}
            }
        }
        Self::Public
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::FriendsPlus => "friend+",
            Self::Friends => "friends",
            Self::Group => "group",
        }
    }
}

/// A friend's location after the world lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLocation {
    Offline,
    Private,
    Traveling,
    Instance {
        world_name: String,
        instance_id: String,
        access: InstanceAccess,
    },
    /// Descriptor that could not be parsed or resolved, kept verbatim
    Raw(String),
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => f.write_str("offline"),
            Self::Private => f.write_str("private"),
            Self::Traveling => f.write_str("traveling"),
            Self::Instance {
                world_name,
                instance_id,
                access,
            } => write!(f, "{world_name} #{instance_id} {}", access.label()),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

/// A friend together with their resolved location
#[derive(Debug, Clone, PartialEq)]
pub struct FriendPresence {
    pub friend: Friend,
    pub location: ResolvedLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: &str = "wrld_abcdef12-0000-0000-0000-000000000000";

    #[test]
    fn parses_public_instance() {
        let location = FriendLocation::parse(&format!("{WORLD}:12345")).unwrap();
        let FriendLocation::Instance(instance) = location else {
            panic!("expected an instance");
        };
        assert_eq!(instance.world_id, WORLD);
        assert_eq!(instance.instance_id, "12345");
        assert_eq!(instance.access, InstanceAccess::Public);
    }

    #[test]
    fn hidden_modifier_maps_to_friend_plus() {
        let location = FriendLocation::parse(&format!("{WORLD}:12345~hidden(usr_x)")).unwrap();
        let FriendLocation::Instance(instance) = location else {
            panic!("expected an instance");
        };
        assert_eq!(instance.instance_id, "12345");
        assert_eq!(instance.access, InstanceAccess::FriendsPlus);
        assert_eq!(instance.access.label(), "friend+");
    }

    #[test]
    fn group_instance_with_extra_modifiers() {
        let descriptor =
            format!("{WORLD}:55~group(grp_11111111-2222-3333-4444-555555555555)~region(eu)");
        let location = FriendLocation::parse(&descriptor).unwrap();
        let FriendLocation::Instance(instance) = location else {
            panic!("expected an instance");
        };
        assert_eq!(instance.access, InstanceAccess::Group);
    }

    #[test]
    fn region_modifier_alone_stays_public() {
        let location = FriendLocation::parse(&format!("{WORLD}:7~region(jp)")).unwrap();
        let FriendLocation::Instance(instance) = location else {
            panic!("expected an instance");
        };
        assert_eq!(instance.access, InstanceAccess::Public);
    }

    #[test]
    fn named_states_parse() {
        assert_eq!(FriendLocation::parse("offline"), Some(FriendLocation::Offline));
        assert_eq!(FriendLocation::parse("private"), Some(FriendLocation::Private));
        assert_eq!(
            FriendLocation::parse("traveling"),
            Some(FriendLocation::Traveling)
        );
    }

    #[test]
    fn malformed_descriptors_do_not_parse() {
        assert_eq!(FriendLocation::parse(""), None);
        assert_eq!(FriendLocation::parse("wrld_not-a-uuid:123"), None);
        assert_eq!(FriendLocation::parse(&format!("{WORLD}:abc")), None);
        assert_eq!(FriendLocation::parse(&format!("{WORLD}:")), None);
        assert_eq!(FriendLocation::parse("usr_123:456"), None);
    }

    #[test]
    fn resolved_instance_display_format() {
        let resolved = ResolvedLocation::Instance {
            world_name: "Test World".to_string(),
            instance_id: "12345".to_string(),
            access: InstanceAccess::FriendsPlus,
        };
        assert_eq!(resolved.to_string(), "Test World #12345 friend+");
    }
}
