//! Applet identifiers and the library-applet program table.
//!
//! The applet manager names library applets by [`AppletId`], while the
//! configuration stores them by program id. The mapping below is fixed by the
//! OS. Program ids `...100C` and `...1012` have no library applet.

/// Applet identifier, as understood by the applet manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum AppletId {
    #[default]
    None = 0x00,
    Application = 0x01,
    OverlayApplet = 0x02,
    SystemAppletMenu = 0x03,
    SystemApplication = 0x04,
    LibraryAppletAuth = 0x0A,
    LibraryAppletCabinet = 0x0B,
    LibraryAppletController = 0x0C,
    LibraryAppletDataErase = 0x0D,
    LibraryAppletError = 0x0E,
    LibraryAppletNetConnect = 0x0F,
    LibraryAppletPlayerSelect = 0x10,
    LibraryAppletSwkbd = 0x11,
    LibraryAppletMiiEdit = 0x12,
    LibraryAppletWeb = 0x13,
    LibraryAppletShop = 0x14,
    LibraryAppletPhotoViewer = 0x15,
    LibraryAppletSet = 0x16,
    LibraryAppletOfflineWeb = 0x17,
    LibraryAppletLoginShare = 0x18,
    LibraryAppletWifiWebAuth = 0x19,
    LibraryAppletMyPage = 0x1A,
}

impl AppletId {
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            0x00 => Some(Self::None),
            0x01 => Some(Self::Application),
            0x02 => Some(Self::OverlayApplet),
            0x03 => Some(Self::SystemAppletMenu),
            0x04 => Some(Self::SystemApplication),
            0x0A => Some(Self::LibraryAppletAuth),
            0x0B => Some(Self::LibraryAppletCabinet),
            0x0C => Some(Self::LibraryAppletController),
            0x0D => Some(Self::LibraryAppletDataErase),
            0x0E => Some(Self::LibraryAppletError),
            0x0F => Some(Self::LibraryAppletNetConnect),
            0x10 => Some(Self::LibraryAppletPlayerSelect),
            0x11 => Some(Self::LibraryAppletSwkbd),
            0x12 => Some(Self::LibraryAppletMiiEdit),
            0x13 => Some(Self::LibraryAppletWeb),
            0x14 => Some(Self::LibraryAppletShop),
            0x15 => Some(Self::LibraryAppletPhotoViewer),
            0x16 => Some(Self::LibraryAppletSet),
            0x17 => Some(Self::LibraryAppletOfflineWeb),
            0x18 => Some(Self::LibraryAppletLoginShare),
            0x19 => Some(Self::LibraryAppletWifiWebAuth),
            0x1A => Some(Self::LibraryAppletMyPage),
            _ => None,
        }
    }

    /// Returns true for [`AppletId::None`].
    #[inline]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Library applets and the program ids they run as, in program-id order.
pub const APPLET_TABLE: [(u64, AppletId); 17] = [
    (0x0100000000001001, AppletId::LibraryAppletAuth),
    (0x0100000000001002, AppletId::LibraryAppletCabinet),
    (0x0100000000001003, AppletId::LibraryAppletController),
    (0x0100000000001004, AppletId::LibraryAppletDataErase),
    (0x0100000000001005, AppletId::LibraryAppletError),
    (0x0100000000001006, AppletId::LibraryAppletNetConnect),
    (0x0100000000001007, AppletId::LibraryAppletPlayerSelect),
    (0x0100000000001008, AppletId::LibraryAppletSwkbd),
    (0x0100000000001009, AppletId::LibraryAppletMiiEdit),
    (0x010000000000100A, AppletId::LibraryAppletWeb),
    (0x010000000000100B, AppletId::LibraryAppletShop),
    (0x010000000000100D, AppletId::LibraryAppletPhotoViewer),
    (0x010000000000100E, AppletId::LibraryAppletSet),
    (0x010000000000100F, AppletId::LibraryAppletOfflineWeb),
    (0x0100000000001010, AppletId::LibraryAppletLoginShare),
    (0x0100000000001011, AppletId::LibraryAppletWifiWebAuth),
    (0x0100000000001013, AppletId::LibraryAppletMyPage),
];

/// Returns the program id of a library applet, or `0` if it has none.
pub fn program_id_for_applet_id(id: AppletId) -> u64 {
    APPLET_TABLE
        .iter()
        .find(|(_, applet)| *applet == id)
        .map_or(0, |(program_id, _)| *program_id)
}

/// Returns the library applet running as `program_id`, or [`AppletId::None`].
pub fn applet_id_for_program_id(program_id: u64) -> AppletId {
    APPLET_TABLE
        .iter()
        .find(|(program, _)| *program == program_id)
        .map_or(AppletId::None, |(_, applet)| *applet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_maps_both_ways() {
        assert_eq!(
            applet_id_for_program_id(0x010000000000100B),
            AppletId::LibraryAppletShop
        );
        assert_eq!(
            program_id_for_applet_id(AppletId::LibraryAppletShop),
            0x010000000000100B
        );
    }

    #[test]
    fn lookups_are_inverse_over_the_table() {
        for (program_id, applet_id) in APPLET_TABLE {
            assert_eq!(applet_id_for_program_id(program_id), applet_id);
            assert_eq!(program_id_for_applet_id(applet_id), program_id);
        }
    }

    #[test]
    fn gaps_and_unknown_ids_map_to_nothing() {
        assert_eq!(applet_id_for_program_id(0x010000000000100C), AppletId::None);
        assert_eq!(applet_id_for_program_id(0x0100000000001012), AppletId::None);
        assert_eq!(applet_id_for_program_id(0), AppletId::None);
        assert_eq!(program_id_for_applet_id(AppletId::None), 0);
        assert_eq!(program_id_for_applet_id(AppletId::SystemAppletMenu), 0);
    }

    #[test]
    fn raw_values_round_trip() {
        for (_, applet_id) in APPLET_TABLE {
            assert_eq!(AppletId::from_raw(applet_id.as_raw()), Some(applet_id));
        }
        assert_eq!(AppletId::from_raw(0x05), None);
    }
}
