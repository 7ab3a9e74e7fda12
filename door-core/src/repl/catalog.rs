//! Static console command catalog used for help output.

/// Help entry for one console command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

const COMMANDS: [CommandSpec; 7] = [
    CommandSpec {
        name: "light",
        usage: "light <raw>",
        summary: "set the raw light-sensor reading (0 is brightest)",
    },
    CommandSpec {
        name: "press",
        usage: "press",
        summary: "press and hold the override button",
    },
    CommandSpec {
        name: "release",
        usage: "release",
        summary: "release the override button",
    },
    CommandSpec {
        name: "advance",
        usage: "advance <duration>",
        summary: "run the controller forward, e.g. `advance 15s` or `advance 2h`",
    },
    CommandSpec {
        name: "status",
        usage: "status",
        summary: "show the committed state, debounce progress and door state",
    },
    CommandSpec {
        name: "events",
        usage: "events [count]",
        summary: "list recent telemetry, newest last",
    },
    CommandSpec {
        name: "help",
        usage: "help [command]",
        summary: "list commands or describe one",
    },
];

/// Returns the full command catalog.
#[must_use]
pub const fn commands() -> &'static [CommandSpec] {
    &COMMANDS
}

/// Finds a command by name (case insensitive).
#[must_use]
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find("ADVANCE").map(|spec| spec.name), Some("advance"));
        assert!(find("reboot").is_none());
    }

    #[test]
    fn names_are_unique() {
        for (index, spec) in commands().iter().enumerate() {
            assert!(
                commands()[index + 1..]
                    .iter()
                    .all(|other| other.name != spec.name)
            );
        }
    }
}
