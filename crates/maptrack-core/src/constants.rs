//! Game and hardware constants shared across the decoder, tracker and overlay.

/// Side length of one map sheet in map pixels. Coordinates at or beyond
/// this value belong to the secondary sub-map.
pub const MAP_WRAP: u16 = 8192;

/// Module id: dungeon (underworld) gameplay.
pub const MODULE_DUNGEON: u8 = 0x07;
/// Module id: overworld gameplay.
pub const MODULE_OVERWORLD: u8 = 0x09;
/// Module id: special overworld areas (Master Sword grove, Zora's domain).
pub const MODULE_SPECIAL_OVERWORLD: u8 = 0x0B;
/// Module id: triforce room.
pub const MODULE_TRIFORCE_ROOM: u8 = 0x19;
/// Module id: end credits.
pub const MODULE_CREDITS: u8 = 0x1A;

/// Modules in which the player is in control and coordinates are meaningful.
pub const IN_GAME_MODULES: [u8; 3] = [MODULE_DUNGEON, MODULE_OVERWORLD, MODULE_SPECIAL_OVERWORLD];

/// Modules reached only after the game has been beaten.
pub const COMPLETED_MODULES: [u8; 2] = [MODULE_TRIFORCE_ROOM, MODULE_CREDITS];

/// Race-mode flag value marking a tournament ROM.
pub const RACE_MODE_ENABLED: u8 = 0x01;

/// Cartridge header ROM name.
pub const ROM_NAME_ADDRESS: u32 = 0x7FC0;
/// Length of the cartridge header ROM name.
pub const ROM_NAME_SIZE: u32 = 0x15;

/// 32-bit frame counter in SRAM.
pub const FRAME_COUNTER_ADDRESS: u32 = 0xF5F43E;
/// Size of the frame counter.
pub const FRAME_COUNTER_SIZE: u32 = 4;

/// NTSC SNES frame rate in Hz.
pub const HARDWARE_FRAME_RATE: f64 = 60.0988;

/// Overworld camera calibration: vertical screen-border offset.
pub const OW_CAMERA_Y_OFFSET: i32 = 108;
/// Overworld camera calibration: horizontal screen-border offset.
pub const OW_CAMERA_X_OFFSET: i32 = 123;

/// Visible screen width in logical pixels.
pub const VIEWPORT_WIDTH: u32 = 256;
/// Visible screen height in logical pixels.
pub const VIEWPORT_HEIGHT: u32 = 224;

/// Ancilla id marking an empty slot.
///
/// Sprite ids have no such value: sprite 0x00 is a real sprite.
pub const NO_ANCILLA_ID: u8 = 0x00;
