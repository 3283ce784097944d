/// Raw key code, numbered like GLFW key tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u16);

impl Key {
    pub const SPACE: Key = Key(32);
    pub const APOSTROPHE: Key = Key(39);
    pub const COMMA: Key = Key(44);
    pub const MINUS: Key = Key(45);
    pub const PERIOD: Key = Key(46);
    pub const SLASH: Key = Key(47);
    pub const NUM_0: Key = Key(48);
    pub const NUM_1: Key = Key(49);
    pub const NUM_2: Key = Key(50);
    pub const NUM_3: Key = Key(51);
    pub const NUM_4: Key = Key(52);
    pub const NUM_5: Key = Key(53);
    pub const NUM_6: Key = Key(54);
    pub const NUM_7: Key = Key(55);
    pub const NUM_8: Key = Key(56);
    pub const NUM_9: Key = Key(57);
    pub const SEMICOLON: Key = Key(59);
    pub const EQUAL: Key = Key(61);
    pub const A: Key = Key(65);
    pub const B: Key = Key(66);
    pub const C: Key = Key(67);
    pub const D: Key = Key(68);
    pub const E: Key = Key(69);
    pub const F: Key = Key(70);
    pub const G: Key = Key(71);
    pub const H: Key = Key(72);
    pub const I: Key = Key(73);
    pub const J: Key = Key(74);
    pub const K: Key = Key(75);
    pub const L: Key = Key(76);
    pub const M: Key = Key(77);
    pub const N: Key = Key(78);
    pub const O: Key = Key(79);
    pub const P: Key = Key(80);
    pub const Q: Key = Key(81);
    pub const R: Key = Key(82);
    pub const S: Key = Key(83);
    pub const T: Key = Key(84);
    pub const U: Key = Key(85);
    pub const V: Key = Key(86);
    pub const W: Key = Key(87);
    pub const X: Key = Key(88);
    pub const Y: Key = Key(89);
    pub const Z: Key = Key(90);
    pub const LEFT_BRACKET: Key = Key(91);
    pub const BACKSLASH: Key = Key(92);
    pub const RIGHT_BRACKET: Key = Key(93);
    pub const GRAVE_ACCENT: Key = Key(96);
    pub const ESCAPE: Key = Key(256);
    pub const ENTER: Key = Key(257);
    pub const TAB: Key = Key(258);
    pub const BACKSPACE: Key = Key(259);
    pub const INSERT: Key = Key(260);
    pub const DELETE: Key = Key(261);
    pub const RIGHT: Key = Key(262);
    pub const LEFT: Key = Key(263);
    pub const DOWN: Key = Key(264);
    pub const UP: Key = Key(265);
    pub const PAGE_UP: Key = Key(266);
    pub const PAGE_DOWN: Key = Key(267);
    pub const HOME: Key = Key(268);
    pub const END: Key = Key(269);
    pub const CAPS_LOCK: Key = Key(280);
    pub const F1: Key = Key(290);
    pub const F2: Key = Key(291);
    pub const F3: Key = Key(292);
    pub const F4: Key = Key(293);
    pub const F5: Key = Key(294);
    pub const F6: Key = Key(295);
    pub const F7: Key = Key(296);
    pub const F8: Key = Key(297);
    pub const F9: Key = Key(298);
    pub const F10: Key = Key(299);
    pub const F11: Key = Key(300);
    pub const F12: Key = Key(301);
    pub const LEFT_SHIFT: Key = Key(340);
    pub const LEFT_CONTROL: Key = Key(341);
    pub const LEFT_ALT: Key = Key(342);
    pub const RIGHT_SHIFT: Key = Key(344);
    pub const RIGHT_CONTROL: Key = Key(345);
    pub const RIGHT_ALT: Key = Key(346);

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Mouse button index, numbered like GLFW mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MouseButton(pub u8);

impl MouseButton {
    pub const LEFT: MouseButton = MouseButton(0);
    pub const RIGHT: MouseButton = MouseButton(1);
    pub const MIDDLE: MouseButton = MouseButton(2);
    pub const BACK: MouseButton = MouseButton(3);
    pub const FORWARD: MouseButton = MouseButton(4);

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}
