use maptrack::{
    CoordinateSample, DeviceId, MapRegion, MemoryMapping, MemoryTransport, OverlayFrame,
    OverlayLayers, PollError, PollOutcome, PollPipeline, ReadRequest, TransportError, ViewOptions,
};
use std::cell::RefCell;
use std::collections::HashMap;

const ROM_NAME: u32 = 0x7FC0;

/// Console double backed by a sparse address → bytes map.
struct ScriptedConsole {
    mapping: RefCell<Option<MemoryMapping>>,
    memory: RefCell<HashMap<u32, Vec<u8>>>,
}

impl ScriptedConsole {
    fn new(mapping: MemoryMapping, rom_name: &str) -> Self {
        let console = ScriptedConsole {
            mapping: RefCell::new(Some(mapping)),
            memory: RefCell::new(HashMap::new()),
        };
        console.poke(ROM_NAME, rom_name.as_bytes());
        console
    }

    fn poke(&self, address: u32, bytes: &[u8]) {
        self.memory.borrow_mut().insert(address, bytes.to_vec());
    }

    fn peek(&self, address: u32, size: u32) -> Vec<u8> {
        let mut data = self.memory.borrow().get(&address).cloned().unwrap_or_default();
        data.resize(size as usize, 0);
        data
    }

    fn swap_rom(&self, mapping: MemoryMapping, rom_name: &str) {
        *self.mapping.borrow_mut() = Some(mapping);
        self.poke(ROM_NAME, rom_name.as_bytes());
    }

    /// Standard ROM layout.
    fn standard_frame(&self, module: u8, world: u8, x: u16, y: u16, race: u8) {
        self.poke(0xF50010, &[module]);
        self.poke(0xF50FFF, &[world]);
        self.poke(0x180213, &[race]);
        self.poke(0xF50020, &coords(x, y));
    }

    /// Practice hack layout.
    fn practice_frame(&self, module: u8, world: u8, x: u16, y: u16) {
        self.poke(0xE07C04, &[module]);
        self.poke(0xE07C06, &[world]);
        self.poke(0xE07C00, &coords(x, y));
    }
}

fn coords(x: u16, y: u16) -> Vec<u8> {
    let mut buf = y.to_le_bytes().to_vec();
    buf.extend_from_slice(&x.to_le_bytes());
    buf
}

impl MemoryTransport for ScriptedConsole {
    fn detect_mapping(&self, _: &DeviceId) -> Result<Option<MemoryMapping>, TransportError> {
        Ok(*self.mapping.borrow())
    }

    fn read_batch(
        &self,
        _: &DeviceId,
        _: MemoryMapping,
        requests: &[ReadRequest],
    ) -> Result<Vec<Vec<u8>>, TransportError> {
        Ok(requests.iter().map(|r| self.peek(r.address, r.size)).collect())
    }

    fn read_single(
        &self,
        _: &DeviceId,
        _: MemoryMapping,
        address: u32,
        size: u32,
    ) -> Result<Vec<u8>, TransportError> {
        Ok(self.peek(address, size))
    }
}

fn device() -> DeviceId {
    DeviceId::new("sni://emunw/localhost:48879")
}

#[test]
fn test_light_world_poll_records_one_sample() {
    let console = ScriptedConsole::new(MemoryMapping::LoRom, "VT RANDO");
    console.poke(0xF50010, &[0x09]);
    console.poke(0xF50FFF, &[0x00]);
    console.poke(0x180213, &[0x00]);
    console.poke(0xF50020, &[0x64, 0x00, 0xC8, 0x00]);

    let mut pipeline = PollPipeline::new();
    let handle = pipeline.handle();
    let outcome = pipeline.poll(&console, Some(&device())).unwrap();

    let expected = CoordinateSample {
        region: MapRegion::LightWorld,
        x: 200,
        y: 100,
    };
    assert!(matches!(outcome, PollOutcome::Tracked { sample, .. } if sample == expected));
    assert_eq!(handle.region(), MapRegion::LightWorld);
    assert_eq!(handle.history(), vec![expected]);
}

#[test]
fn test_dungeon_secondary_sheet_adjusts_y() {
    let console = ScriptedConsole::new(MemoryMapping::LoRom, "VT RANDO");
    console.standard_frame(0x07, 0, 512, 9000, 0);

    let mut pipeline = PollPipeline::new();
    pipeline.poll(&console, Some(&device())).unwrap();

    let handle = pipeline.handle();
    assert_eq!(handle.region(), MapRegion::Eg2);
    assert_eq!(handle.history()[0].y, 808);

    match handle.overlay(&ViewOptions::default()) {
        OverlayFrame::Map(geometry) => {
            let player = geometry.player.expect("player marker");
            assert_eq!(player.at.x, 512 + 3);
            assert_eq!(player.at.y, 808 + 8);
        }
        OverlayFrame::RaceHidden => panic!("map should be visible"),
    }
}

#[test]
fn test_overworld_walk_builds_trail_per_region() {
    let console = ScriptedConsole::new(MemoryMapping::LoRom, "VT RANDO");
    let mut pipeline = PollPipeline::new();

    for step in 0..3u16 {
        console.standard_frame(0x09, 0, 100 + step, 200, 0);
        pipeline.poll(&console, Some(&device())).unwrap();
    }
    console.standard_frame(0x07, 0, 50, 60, 0);
    pipeline.poll(&console, Some(&device())).unwrap();
    console.standard_frame(0x07, 0, 55, 60, 0);
    pipeline.poll(&console, Some(&device())).unwrap();

    let options = ViewOptions {
        history_len: 0,
        layers: OverlayLayers::TRAIL,
    };
    let OverlayFrame::Map(geometry) = pipeline.handle().overlay(&options) else {
        panic!("map should be visible");
    };
    assert_eq!(geometry.region, MapRegion::Eg1);
    assert_eq!(geometry.trail.len(), 2);
    assert_eq!(geometry.trail[0].region, MapRegion::LightWorld);
    assert_eq!(geometry.trail[0].segments.len(), 2);
    assert_eq!(geometry.trail[1].segments.len(), 1);
    assert!(geometry.player.is_none());
}

#[test]
fn test_race_rom_stays_hidden_until_completion() {
    let console = ScriptedConsole::new(MemoryMapping::LoRom, "VT TOURNAMENT");
    let mut pipeline = PollPipeline::new();
    let handle = pipeline.handle();

    console.standard_frame(0x09, 0, 10, 10, 1);
    assert_eq!(
        pipeline.poll(&console, Some(&device())).unwrap(),
        PollOutcome::RaceModeBlocked
    );
    assert!(handle.history().is_empty());
    assert_eq!(handle.overlay(&ViewOptions::default()), OverlayFrame::RaceHidden);

    // Triforce room latches the override for the rest of the ROM's lifetime.
    console.standard_frame(0x19, 0, 10, 10, 1);
    pipeline.poll(&console, Some(&device())).unwrap();
    console.standard_frame(0x09, 0, 10, 10, 1);
    for _ in 0..3 {
        assert!(matches!(
            pipeline.poll(&console, Some(&device())).unwrap(),
            PollOutcome::Tracked { .. }
        ));
    }
    assert!(handle.race().overridden);

    // A different ROM re-arms gating.
    console.swap_rom(MemoryMapping::LoRom, "VT TOURNAMENT 2");
    assert_eq!(
        pipeline.poll(&console, Some(&device())).unwrap(),
        PollOutcome::RaceModeBlocked
    );
    assert!(handle.race().map_hidden());
}

#[test]
fn test_practice_hack_is_never_gated() {
    let console = ScriptedConsole::new(MemoryMapping::LoRom, "VT TOURNAMENT");
    let mut pipeline = PollPipeline::new();
    console.standard_frame(0x09, 0, 10, 10, 1);
    pipeline.poll(&console, Some(&device())).unwrap();
    assert!(pipeline.handle().race().map_hidden());

    console.swap_rom(MemoryMapping::Sa1, "ALTTP PRACTICE HACK");
    console.practice_frame(0x09, 1, 40, 50);
    let outcome = pipeline.poll(&console, Some(&device())).unwrap();

    assert!(matches!(outcome, PollOutcome::Tracked { .. }));
    let handle = pipeline.handle();
    assert!(handle.race().overridden);
    assert!(!handle.race().map_hidden());
    assert_eq!(handle.region(), MapRegion::DarkWorld);
    assert_eq!(handle.history().last().map(|s| (s.x, s.y)), Some((40, 50)));
}

#[test]
fn test_unknown_mapping_aborts_without_state_change() {
    let console = ScriptedConsole::new(MemoryMapping::LoRom, "VT RANDO");
    *console.mapping.borrow_mut() = None;
    console.standard_frame(0x09, 0, 1, 1, 0);

    let mut pipeline = PollPipeline::new();
    let err = pipeline.poll(&console, Some(&device())).unwrap_err();
    assert!(matches!(err, PollError::UnsupportedMapping(_)));
    assert!(pipeline.handle().history().is_empty());
    assert_eq!(pipeline.handle().region(), MapRegion::Eg1);
}
