use bevy::{input::ButtonInput, prelude::KeyCode};

/// Input flags for table actions.
pub const INPUT_RESET: u16 = 1 << 0;
pub const INPUT_CARD_1: u16 = 1 << 1;
pub const INPUT_CARD_2: u16 = 1 << 2;
pub const INPUT_CARD_3: u16 = 1 << 3;
pub const INPUT_CARD_4: u16 = 1 << 4;
pub const INPUT_CARD_5: u16 = 1 << 5;
pub const INPUT_CARD_6: u16 = 1 << 6;
pub const INPUT_CARD_7: u16 = 1 << 7;
pub const INPUT_CARD_8: u16 = 1 << 8;
pub const INPUT_CARD_9: u16 = 1 << 9;
pub const INPUT_CARD_10: u16 = 1 << 10;
pub const INPUT_BACK: u16 = 1 << 11;
pub const INPUT_CARD_MASK: u16 = INPUT_CARD_1
    | INPUT_CARD_2
    | INPUT_CARD_3
    | INPUT_CARD_4
    | INPUT_CARD_5
    | INPUT_CARD_6
    | INPUT_CARD_7
    | INPUT_CARD_8
    | INPUT_CARD_9
    | INPUT_CARD_10;

/// Number of hand slots reachable from the keyboard.
pub const MAX_CARD_KEYS: usize = 10;

const CARD_KEYS: [KeyCode; MAX_CARD_KEYS] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
    KeyCode::Digit0,
];

/// Map a hand index (0-9) to an input flag.
pub fn card_flag(index: usize) -> Option<u16> {
    if index < MAX_CARD_KEYS {
        Some(1u16 << (index + 1))
    } else {
        None
    }
}

/// Hand indices whose flags are set, in hand order.
pub fn pressed_card_indices(flags: u16) -> impl Iterator<Item = usize> {
    (0..MAX_CARD_KEYS).filter(move |&index| card_flag(index).is_some_and(|flag| flags & flag != 0))
}

/// Build input flags from keyboard presses.
pub fn flags_from_keyboard(keyboard: &ButtonInput<KeyCode>) -> u16 {
    let mut flags = 0;

    if keyboard.just_pressed(KeyCode::KeyR) {
        flags |= INPUT_RESET;
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        flags |= INPUT_BACK;
    }

    for (index, key) in CARD_KEYS.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            flags |= card_flag(index).unwrap_or(0);
        }
    }

    flags
}

/// Build input flags from a simulated key string (e.g., "R", "1"-"9", "0").
pub fn flags_from_key_string(key: &str) -> u16 {
    let key = key.trim().to_uppercase();
    match key.as_str() {
        "R" => return INPUT_RESET,
        "ESC" | "ESCAPE" => return INPUT_BACK,
        _ => {}
    }

    if let Ok(num) = key.parse::<usize>() {
        return match num {
            1..=9 => card_flag(num - 1).unwrap_or(0),
            0 => INPUT_CARD_10,
            _ => 0,
        };
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_flags_cover_ten_slots() {
        assert_eq!(card_flag(0), Some(INPUT_CARD_1));
        assert_eq!(card_flag(9), Some(INPUT_CARD_10));
        assert_eq!(card_flag(10), None);
        let all = (0..MAX_CARD_KEYS).filter_map(card_flag).fold(0, |acc, f| acc | f);
        assert_eq!(all, INPUT_CARD_MASK);
        assert_eq!(INPUT_CARD_MASK & (INPUT_RESET | INPUT_BACK), 0);
    }

    #[test]
    fn key_strings_map_to_flags() {
        assert_eq!(flags_from_key_string("r"), INPUT_RESET);
        assert_eq!(flags_from_key_string(" Escape "), INPUT_BACK);
        assert_eq!(flags_from_key_string("1"), INPUT_CARD_1);
        assert_eq!(flags_from_key_string("9"), INPUT_CARD_9);
        assert_eq!(flags_from_key_string("0"), INPUT_CARD_10);
        assert_eq!(flags_from_key_string("11"), 0);
        assert_eq!(flags_from_key_string("D"), 0);
    }

    #[test]
    fn keyboard_presses_become_flags() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::Digit3);
        keyboard.press(KeyCode::KeyR);
        let flags = flags_from_keyboard(&keyboard);
        assert_eq!(flags, INPUT_CARD_3 | INPUT_RESET);
        assert_eq!(pressed_card_indices(flags).collect::<Vec<_>>(), vec![2]);

        keyboard.clear();
        assert_eq!(flags_from_keyboard(&keyboard), 0);
    }
}
