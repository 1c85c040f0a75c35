// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry discovery bookkeeping.
//!
//! [`GlobalTable`] records which advertised registry globals the platform
//! cares about, keyed by interface name. The backend binds a proxy for each
//! entry that [`GlobalTable::advertise`] classifies. Advertisement order is
//! compositor-defined, so nothing here depends on it.
//!
//! Removal notifications are accepted and logged but do not change the table:
//! the required globals are assumed to live as long as the process.

use alloc::vec::Vec;

/// Registry globals the platform binds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlobalKind {
    /// `wl_compositor`: surface and region factory.
    Compositor,
    /// `xdg_wm_base`: shell / window management.
    WmBase,
    /// `wl_seat`: input devices.
    Seat,
    /// `wl_shm`: shared memory, used for the cursor theme.
    Shm,
}

impl GlobalKind {
    /// Every kind, in binding-independent order.
    pub const ALL: [Self; 4] = [Self::Compositor, Self::WmBase, Self::Seat, Self::Shm];

    /// Wayland interface name.
    #[must_use]
    pub const fn interface(self) -> &'static str {
        match self {
            Self::Compositor => "wl_compositor",
            Self::WmBase => "xdg_wm_base",
            Self::Seat => "wl_seat",
            Self::Shm => "wl_shm",
        }
    }

    /// Highest version the platform binds.
    #[must_use]
    pub const fn max_version(self) -> u32 {
        match self {
            Self::Compositor => 4,
            Self::WmBase => 1,
            Self::Seat => 5,
            Self::Shm => 1,
        }
    }

    /// Whether discovery fails without this global.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Compositor | Self::WmBase)
    }

    /// Looks up a kind by interface name.
    #[must_use]
    pub fn from_interface(interface: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.interface() == interface)
    }
}

/// One bound registry global.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlobalEntry {
    /// What the global provides.
    pub kind: GlobalKind,
    /// Registry name (numeric id).
    pub name: u32,
    /// Version that was bound.
    pub version: u32,
}

/// Table of bound registry globals.
#[derive(Clone, Debug, Default)]
pub struct GlobalTable {
    entries: Vec<GlobalEntry>,
}

impl GlobalTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a registry advertisement.
    ///
    /// Returns the entry to bind if the interface is of interest and not
    /// already bound; later duplicates (for example a second seat) are
    /// ignored.
    pub fn advertise(&mut self, name: u32, interface: &str, version: u32) -> Option<GlobalEntry> {
        let kind = GlobalKind::from_interface(interface)?;
        if self.get(kind).is_some() {
            tracing::debug!(interface, name, "ignoring duplicate global");
            return None;
        }
        let entry = GlobalEntry {
            kind,
            name,
            version: version.min(kind.max_version()),
        };
        self.entries.push(entry);
        Some(entry)
    }

    /// Logs a removal notification; the table keeps the entry.
    ///
    /// Returns the kind if the removed global was one of ours.
    pub fn note_removed(&self, name: u32) -> Option<GlobalKind> {
        let kind = self
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.kind);
        match kind {
            Some(kind) => tracing::warn!(
                interface = kind.interface(),
                name,
                "bound global removed by compositor; keeping proxy"
            ),
            None => tracing::debug!(name, "global removed"),
        }
        kind
    }

    /// Returns the entry bound for `kind`.
    #[must_use]
    pub fn get(&self, kind: GlobalKind) -> Option<GlobalEntry> {
        self.entries.iter().copied().find(|entry| entry.kind == kind)
    }

    /// Required kinds that were never advertised.
    pub fn missing_required(&self) -> impl Iterator<Item = GlobalKind> + '_ {
        GlobalKind::ALL
            .into_iter()
            .filter(|kind| kind.is_required() && self.get(*kind).is_none())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{GlobalKind, GlobalTable};

    #[test]
    fn classifies_known_interfaces_only() {
        let mut table = GlobalTable::new();
        assert!(table.advertise(1, "wl_output", 4).is_none());
        assert!(table.advertise(2, "zwp_linux_dmabuf_v1", 4).is_none());

        let entry = table.advertise(3, "wl_compositor", 6);
        assert_eq!(entry.map(|e| e.kind), Some(GlobalKind::Compositor));
        assert_eq!(entry.map(|e| e.version), Some(4), "version is clamped");
    }

    #[test]
    fn order_does_not_matter() {
        let mut forward = GlobalTable::new();
        let mut backward = GlobalTable::new();
        let ads = [
            (1, "wl_shm", 1),
            (2, "wl_seat", 7),
            (3, "xdg_wm_base", 5),
            (4, "wl_compositor", 5),
        ];
        for (name, interface, version) in ads {
            forward.advertise(name, interface, version);
        }
        for (name, interface, version) in ads.into_iter().rev() {
            backward.advertise(name, interface, version);
        }
        for kind in GlobalKind::ALL {
            assert_eq!(forward.get(kind), backward.get(kind));
        }
        assert_eq!(forward.missing_required().count(), 0);
    }

    #[test]
    fn reports_missing_required() {
        let mut table = GlobalTable::new();
        table.advertise(1, "wl_seat", 5);
        table.advertise(2, "wl_shm", 1);
        let missing: Vec<_> = table.missing_required().collect();
        assert_eq!(missing, [GlobalKind::Compositor, GlobalKind::WmBase]);
    }

    #[test]
    fn duplicate_globals_keep_first_binding() {
        let mut table = GlobalTable::new();
        assert!(table.advertise(10, "wl_seat", 5).is_some());
        assert!(table.advertise(11, "wl_seat", 5).is_none());
        assert_eq!(table.get(GlobalKind::Seat).map(|e| e.name), Some(10));
    }

    #[test]
    fn removal_is_noted_but_entry_kept() {
        let mut table = GlobalTable::new();
        table.advertise(7, "wl_compositor", 4);
        assert_eq!(table.note_removed(7), Some(GlobalKind::Compositor));
        assert_eq!(table.note_removed(99), None);
        assert!(
            table.get(GlobalKind::Compositor).is_some(),
            "removed global keeps its entry"
        );
    }
}
