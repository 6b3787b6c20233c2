use loopstation::{io::AudioBuffer, Engine, EngineConfig};

#[test]
fn renders_silence_with_idle_engine() {
    let (mut engine, _handle) = Engine::new(EngineConfig::default());
    let mut output = AudioBuffer::new(2, 512);

    for _ in 0..8 {
        engine.process_block(&mut output);
        assert_eq!(output.peak(), 0.0);
    }
}

#[test]
fn full_chord_stays_in_range() {
    let (mut engine, mut handle) = Engine::new(EngineConfig::default());
    handle.set_volume(0, 2.0).unwrap();
    for pitch in [36, 43, 48, 52, 55, 60, 64, 67, 72, 76] {
        handle.note_on(pitch, 1.0).unwrap();
    }

    let mut output = AudioBuffer::new(2, 512);
    let mut heard = false;
    for _ in 0..64 {
        engine.process_block(&mut output);
        heard |= output.peak() > 0.0;
        for ch in 0..output.num_channels() {
            assert!(output.channel(ch).iter().all(|s| s.abs() <= 1.0));
        }
    }
    assert!(heard);
}
