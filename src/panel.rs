use crate::models::{DefaultSize, PauseBehavior, PlayerPreferences, PreferencesPatch};

/// Buffered editor over [`PlayerPreferences`].
///
/// Edits touch only the draft. [`SettingsPanel::save`] hands back a patch of
/// just the fields edited since the panel opened, so preferences changed
/// elsewhere in the meantime are left alone. Dropping the panel discards
/// everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPanel {
    original: PlayerPreferences,
    draft: PlayerPreferences,
}

impl SettingsPanel {
    pub fn open(current: PlayerPreferences) -> Self {
        Self {
            original: current,
            draft: current,
        }
    }

    pub fn draft(&self) -> &PlayerPreferences {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    pub fn set_pause_behavior(&mut self, pause_behavior: PauseBehavior) {
        self.draft.pause_behavior = pause_behavior;
    }

    pub fn set_default_size(&mut self, default_size: DefaultSize) {
        self.draft.default_size = default_size;
    }

    pub fn set_auto_play_next(&mut self, auto_play_next: bool) {
        self.draft.auto_play_next = auto_play_next;
    }

    /// Throws away edits but keeps the panel open.
    pub fn revert(&mut self) {
        self.draft = self.original;
    }

    pub fn save(self) -> PreferencesPatch {
        let (original, draft) = (self.original, self.draft);
        PreferencesPatch {
            pause_behavior: (draft.pause_behavior != original.pause_behavior)
                .then_some(draft.pause_behavior),
            default_size: (draft.default_size != original.default_size)
                .then_some(draft.default_size),
            auto_play_next: (draft.auto_play_next != original.auto_play_next)
                .then_some(draft.auto_play_next),
        }
    }
}
