//! Translation from crossterm terminal events to the pipeline protocol.

use core_events::{ControlKey, KeyEvent, KeyModifiers, MediaKey};
use crossterm::event::{
    Event as CEvent, KeyCode as CKeyCode, KeyEventKind as CKind, KeyModifiers as CMods,
    MediaKeyCode as CMedia,
};

/// Map one raw terminal event. Anything outside the protocol (key releases,
/// mouse, focus, paste reports, unrecognized codes) becomes the inert
/// `ControlKey::Error` sentinel rather than an error: only device I/O
/// failures are faults.
pub(crate) fn map_event(event: CEvent) -> KeyEvent {
    match event {
        CEvent::Key(key) if matches!(key.kind, CKind::Press | CKind::Repeat) => {
            map_key(key.code, key.modifiers)
        }
        CEvent::Resize(cols, rows) => KeyEvent::Resize { cols, rows },
        _ => KeyEvent::Control(ControlKey::Error),
    }
}

fn map_key(code: CKeyCode, mods: CMods) -> KeyEvent {
    let control = match code {
        CKeyCode::Char(ch) => {
            return KeyEvent::Printable {
                ch,
                mods: map_mods(mods),
            };
        }
        CKeyCode::Esc => ControlKey::Esc,
        CKeyCode::Enter => ControlKey::Enter,
        CKeyCode::Tab | CKeyCode::BackTab => ControlKey::Tab,
        CKeyCode::Backspace => ControlKey::Backspace,
        CKeyCode::Insert => ControlKey::Insert,
        CKeyCode::Delete => ControlKey::Delete,
        CKeyCode::Home => ControlKey::Home,
        CKeyCode::End => ControlKey::End,
        CKeyCode::Up => ControlKey::Up,
        CKeyCode::Down => ControlKey::Down,
        CKeyCode::Left => ControlKey::Left,
        CKeyCode::Right => ControlKey::Right,
        CKeyCode::PageUp => ControlKey::PageUp,
        CKeyCode::PageDown => ControlKey::PageDown,
        CKeyCode::F(n) => ControlKey::F(n),
        CKeyCode::Media(media) => match map_media(media) {
            Some(key) => ControlKey::Media(key),
            None => ControlKey::Error,
        },
        CKeyCode::Null
        | CKeyCode::CapsLock
        | CKeyCode::ScrollLock
        | CKeyCode::NumLock
        | CKeyCode::PrintScreen
        | CKeyCode::Pause
        | CKeyCode::Menu
        | CKeyCode::KeypadBegin
        | CKeyCode::Modifier(_) => ControlKey::Error,
    };
    KeyEvent::Control(control)
}

fn map_media(code: CMedia) -> Option<MediaKey> {
    let key = match code {
        CMedia::Play => MediaKey::Play,
        CMedia::Pause => MediaKey::Pause,
        CMedia::PlayPause => MediaKey::PlayPause,
        CMedia::Stop => MediaKey::Stop,
        CMedia::TrackNext => MediaKey::Next,
        CMedia::TrackPrevious => MediaKey::Previous,
        CMedia::RaiseVolume => MediaKey::VolumeUp,
        CMedia::LowerVolume => MediaKey::VolumeDown,
        CMedia::MuteVolume => MediaKey::Mute,
        CMedia::Reverse | CMedia::FastForward | CMedia::Rewind | CMedia::Record => return None,
    };
    Some(key)
}

fn map_mods(mods: CMods) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if mods.contains(CMods::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    if mods.contains(CMods::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if mods.contains(CMods::ALT) {
        out |= KeyModifiers::ALT;
    }
    // The terminal's "super"/"meta" distinction collapses into one OS flag.
    if mods.intersects(CMods::SUPER | CMods::META) {
        out |= KeyModifiers::META;
    }
    out
}
