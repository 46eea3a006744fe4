/// キャプチャ経路（間引き・ライン転送）の統合テスト
use anyhow::Result;
use camera_sensor_control::hardware::mock::{
    MockBoard, MockBus, MockClock, MockDriver, MockFramePool, MockPort,
};
use camera_sensor_control::hardware::{ChipId, SensorFamily};
use camera_sensor_control::{FrameSize, PixFormat, Sensor, SensorConfig, SensorHal};

type TestSensor = Sensor<MockBus, MockPort, MockFramePool, MockClock>;

fn setup(driver: &MockDriver) -> (TestSensor, MockClock) {
    let board = MockBoard::new();
    let clock = MockClock::new();
    let pool = MockFramePool::new(500_000);
    let hal = SensorHal::new(board.bus(), MockPort::new(), pool, clock.clone());
    let mut sensor = Sensor::new(hal, SensorConfig::default());
    sensor.install_driver(SensorFamily::Hm01b0, ChipId::HM01B0, Box::new(driver.clone()));
    (sensor, clock)
}

/// 1フレーム分を受信し、書き込めたライン数を返す
fn capture(
    sensor: &mut TestSensor,
    lines: &[Vec<u8>],
    frame: &mut [u8],
    line_len: usize,
) -> Result<usize> {
    sensor.begin_frame();
    let mut written = 0;
    for (row, line) in lines.iter().enumerate() {
        sensor.throttle_framerate();
        if sensor.copy_line(line, &mut frame[row * line_len..])? {
            written += 1;
        }
    }
    sensor.notify_frame();
    Ok(written)
}

#[test]
fn test_transposed_frame_is_assembled_by_columns() -> Result<()> {
    // Given: 4x2 のウィンドウを転置して受信
    let driver = MockDriver::new();
    let (mut sensor, _clock) = setup(&driver);
    sensor.set_pixformat(PixFormat::Grayscale)?;
    sensor.set_framesize(FrameSize::Qqqqvga)?;
    sensor.set_windowing(0, 0, 4, 2)?;
    sensor.set_transpose(true)?;
    let lines = vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]];
    let mut frame = [0u8; 8];

    // When: 転置時は各ラインが1列になる（列の先頭は行番号）
    let written = capture(&mut sensor, &lines, &mut frame, 1)?;

    // Then
    assert_eq!(written, 2);
    assert_eq!(frame, [1, 5, 2, 6, 3, 7, 4, 8]);
    Ok(())
}

#[test]
fn test_software_throttle_halves_30fps_source() -> Result<()> {
    // Given: 15fps 目標、ドライバはフレームレート非対応
    let driver = MockDriver::new();
    driver.set_unsupported("set_framerate");
    let (mut sensor, clock) = setup(&driver);
    sensor.set_pixformat(PixFormat::Bayer)?;
    sensor.set_framesize(FrameSize::Qqqqvga)?;
    sensor.set_windowing(0, 0, 4, 1)?;
    sensor.set_framerate(15)?;
    let lines = vec![vec![9, 9, 9, 9]];

    // When: 33ms ごとにフレームが届く
    let mut delivered = 0;
    for _ in 0..6 {
        let mut frame = [0u8; 4];
        if capture(&mut sensor, &lines, &mut frame, 4)? == 1 {
            delivered += 1;
        }
        clock.advance_ms(33);
    }

    // Then: 1つおきに捨てられる
    assert_eq!(delivered, 3);
    Ok(())
}
