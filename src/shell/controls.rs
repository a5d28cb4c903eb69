/// Buttons on the control overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    TogglePlay,
    ToggleMute,
    ToggleMinimize,
    Close,
    ToggleSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    Char(char),
    Other,
}

/// Where keyboard focus currently sits on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusContext {
    /// An `<input>`, `<textarea>` or contenteditable element has focus.
    pub text_input_focused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    TogglePlay,
    SeekBy(f64),
    ToggleMute,
}

pub fn key_command(key: Key, seek_step: f64) -> Option<KeyCommand> {
    match key {
        Key::Space => Some(KeyCommand::TogglePlay),
        Key::ArrowLeft => Some(KeyCommand::SeekBy(-seek_step)),
        Key::ArrowRight => Some(KeyCommand::SeekBy(seek_step)),
        Key::Char(c) if c.eq_ignore_ascii_case(&'k') || c == ' ' => Some(KeyCommand::TogglePlay),
        Key::Char(c) if c.eq_ignore_ascii_case(&'m') => Some(KeyCommand::ToggleMute),
        _ => None,
    }
}

/// Maps a click on the seek bar to a time, linearly over `[0, duration]`.
pub fn seek_target(offset_px: f64, bar_width_px: f64, duration: f64) -> Option<f64> {
    let usable = bar_width_px > 0.0 && duration > 0.0 && offset_px.is_finite();
    if !usable {
        return None;
    }
    let fraction = (offset_px / bar_width_px).clamp(0.0, 1.0);
    Some(fraction * duration)
}

/// Formats seconds as `M:SS`.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(59.9), "0:59");
        assert_eq!(format_clock(60.0), "1:00");
        assert_eq!(format_clock(754.2), "12:34");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn seek_bar_maps_linearly() {
        assert_eq!(seek_target(150.0, 300.0, 120.0), Some(60.0));
        assert_eq!(seek_target(-10.0, 300.0, 120.0), Some(0.0));
        assert_eq!(seek_target(400.0, 300.0, 120.0), Some(120.0));
        assert_eq!(seek_target(10.0, 0.0, 120.0), None);
        assert_eq!(seek_target(10.0, 300.0, 0.0), None);
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(key_command(Key::Char('K'), 5.0), Some(KeyCommand::TogglePlay));
        assert_eq!(key_command(Key::ArrowLeft, 5.0), Some(KeyCommand::SeekBy(-5.0)));
        assert_eq!(key_command(Key::Char('m'), 5.0), Some(KeyCommand::ToggleMute));
        assert_eq!(key_command(Key::Char('x'), 5.0), None);
        assert_eq!(key_command(Key::Other, 5.0), None);
    }
}
