/// 設定状態機械の統合テスト
///
/// 冪等性・排他条件・フレームバッファ容量の不変条件を確認します。
use camera_sensor_control::core::types::BufferCount;
use camera_sensor_control::hardware::mock::{
    MockBoard, MockBus, MockClock, MockDriver, MockFramePool, MockPort,
};
use camera_sensor_control::hardware::{ChipId, FramePool, SensorFamily};
use camera_sensor_control::{FrameSize, PixFormat, Sensor, SensorConfig, SensorError, SensorHal};

type TestSensor = Sensor<MockBus, MockPort, MockFramePool, MockClock>;

fn setup(capacity: u32) -> (TestSensor, MockDriver, MockFramePool, MockPort) {
    let board = MockBoard::new();
    let port = MockPort::new();
    let pool = MockFramePool::new(capacity);
    let driver = MockDriver::new();
    let hal = SensorHal::new(board.bus(), port.clone(), pool.clone(), MockClock::new());
    let mut sensor = Sensor::new(hal, SensorConfig::default().with_settle_delay_ms(0));
    sensor.install_driver(SensorFamily::Ov2640, ChipId::OV2640, Box::new(driver.clone()));
    (sensor, driver, pool, port)
}

/// 1フレームが現在のバッファ1枚に収まっていること
fn assert_frame_fits(sensor: &TestSensor, pool: &MockFramePool) {
    let frame = sensor.frame();
    let bpp = u64::from(sensor.get_src_bpp().max(sensor.get_dst_bpp()));
    let bytes = u64::from(frame.u) * u64::from(frame.v) * bpp;
    assert!(
        bytes <= u64::from(pool.buffer_size()),
        "{}x{} x {} > {}",
        frame.u,
        frame.v,
        bpp,
        pool.buffer_size()
    );
}

#[test]
fn test_idempotent_setters_keep_state_identical() {
    // Given
    let (mut sensor, driver, _pool, port) = setup(1_000_000);
    sensor.set_pixformat(PixFormat::Grayscale).unwrap();
    sensor.set_framesize(FrameSize::Vga).unwrap();
    sensor.set_windowing(80, 60, 320, 240).unwrap();
    sensor.set_framerate(15).unwrap();
    sensor.set_vflip(true).unwrap();
    sensor.set_transpose(true).unwrap();
    let state = sensor.state().clone();
    let frame = *sensor.frame();
    let aborts = port.abort_count();
    driver.clear_calls();

    // When: 同じ値をもう一度設定
    sensor.set_pixformat(PixFormat::Grayscale).unwrap();
    sensor.set_framesize(FrameSize::Vga).unwrap();
    sensor.set_windowing(80, 60, 320, 240).unwrap();
    sensor.set_framerate(15).unwrap();
    sensor.set_vflip(true).unwrap();
    sensor.set_transpose(true).unwrap();

    // Then
    assert_eq!(sensor.state(), &state);
    assert_eq!(sensor.frame(), &frame);
    assert_eq!(port.abort_count(), aborts);
    assert!(driver.calls().is_empty());
}

#[test]
fn test_transpose_excludes_yuv422() {
    let (mut sensor, _driver, _pool, _port) = setup(1_000_000);
    sensor.set_pixformat(PixFormat::Rgb565).unwrap();
    sensor.set_transpose(true).unwrap();

    assert_eq!(sensor.set_pixformat(PixFormat::Yuv422), Err(SensorError::PixformatUnsupported));
    assert_eq!(sensor.get_pixformat(), Some(PixFormat::Rgb565));

    sensor.set_transpose(false).unwrap();
    sensor.set_pixformat(PixFormat::Yuv422).unwrap();
    assert_eq!(sensor.set_transpose(true), Err(SensorError::PixformatUnsupported));
    assert_eq!(sensor.set_auto_rotation(true), Err(SensorError::PixformatUnsupported));
    assert!(!sensor.get_transpose());
}

#[test]
fn test_jpeg_exclusions() {
    let (mut sensor, _driver, _pool, _port) = setup(1_000_000);
    sensor.set_pixformat(PixFormat::Rgb565).unwrap();
    sensor.set_framesize(FrameSize::Qvga).unwrap();
    sensor.set_windowing(0, 0, 160, 120).unwrap();

    // クロップ中は JPEG にできない
    assert_eq!(sensor.set_pixformat(PixFormat::Jpeg), Err(SensorError::PixformatUnsupported));

    sensor.set_windowing(0, 0, 320, 240).unwrap();
    sensor.set_pixformat(PixFormat::Jpeg).unwrap();

    // JPEG ではウィンドウ・転置を設定できない
    assert_eq!(sensor.set_windowing(0, 0, 160, 120), Err(SensorError::PixformatUnsupported));
    assert_eq!(sensor.set_transpose(true), Err(SensorError::PixformatUnsupported));
    assert!(!sensor.get_cropped());
}

#[test]
fn test_auto_rotation_excludes_jpeg() {
    let (mut sensor, _driver, _pool, _port) = setup(1_000_000);
    sensor.set_auto_rotation(true).unwrap();

    assert_eq!(sensor.set_pixformat(PixFormat::Jpeg), Err(SensorError::PixformatUnsupported));
    assert_eq!(sensor.set_pixformat(PixFormat::Yuv422), Err(SensorError::PixformatUnsupported));
    assert_eq!(sensor.set_pixformat(PixFormat::Bayer), Ok(()));
}

#[test]
fn test_bayer_is_kept_when_color_would_not_fit() {
    // Given: WVGA2 の Bayer はバッファに収まるが RGB565 は収まらない
    let (mut sensor, driver, pool, _port) = setup(400_000);
    sensor.set_pixformat(PixFormat::Bayer).unwrap();
    sensor.set_framesize(FrameSize::Wvga2).unwrap();
    driver.clear_calls();

    // When
    let result = sensor.set_pixformat(PixFormat::Rgb565);

    // Then: 成功扱いだが Bayer のまま
    assert_eq!(result, Ok(()));
    assert_eq!(sensor.get_pixformat(), Some(PixFormat::Bayer));
    assert!(driver.calls().is_empty());
    assert_frame_fits(&sensor, &pool);
}

#[test]
fn test_oversized_requests_are_rejected_without_change() {
    let (mut sensor, driver, pool, _port) = setup(200_000);
    sensor.set_pixformat(PixFormat::Grayscale).unwrap();

    // VGA グレースケール (307200 バイト) は容量を超える
    assert_eq!(sensor.set_framesize(FrameSize::Vga), Err(SensorError::FramebufferOverflow));
    assert_eq!(sensor.get_framesize(), None);
    assert_eq!(driver.call_count("set_framesize"), 0);

    sensor.set_framesize(FrameSize::Qvga).unwrap();
    assert_frame_fits(&sensor, &pool);

    sensor.set_pixformat(PixFormat::Rgb565).unwrap();
    assert_frame_fits(&sensor, &pool);

    // HVGA RGB565 (307200 バイト) は収まらない
    assert_eq!(sensor.set_framesize(FrameSize::Hvga), Err(SensorError::FramebufferOverflow));
    assert_eq!(sensor.get_framesize(), Some(FrameSize::Qvga));
    assert_eq!(sensor.frame().u, 320);
    assert_frame_fits(&sensor, &pool);
}

#[test]
fn test_color_format_rejected_when_it_cannot_fit() {
    let (mut sensor, _driver, pool, _port) = setup(100_000);
    sensor.set_pixformat(PixFormat::Grayscale).unwrap();
    sensor.set_framesize(FrameSize::Qvga).unwrap();

    assert_eq!(sensor.set_pixformat(PixFormat::Rgb565), Err(SensorError::FramebufferOverflow));
    assert_eq!(sensor.get_pixformat(), Some(PixFormat::Grayscale));

    sensor.set_windowing(0, 0, 200, 200).unwrap();
    sensor.set_pixformat(PixFormat::Rgb565).unwrap();
    assert_frame_fits(&sensor, &pool);
}

#[test]
fn test_buffer_count_is_chosen_by_pool() {
    let (mut sensor, _driver, pool, _port) = setup(300_000);
    sensor.set_pixformat(PixFormat::Grayscale).unwrap();
    sensor.set_framesize(FrameSize::Qvga).unwrap();

    assert_eq!(pool.count(), 3);
    assert_eq!(pool.frame_size(), 76_800);

    sensor.set_framebuffers(BufferCount::Exact(2)).unwrap();
    assert_eq!(pool.count(), 2);
    assert_frame_fits(&sensor, &pool);
}

#[test]
fn test_reconfiguration_invalidates_frame_format() {
    let (mut sensor, _driver, pool, _port) = setup(1_000_000);
    sensor.set_pixformat(PixFormat::Grayscale).unwrap();
    sensor.set_framesize(FrameSize::Qvga).unwrap();

    assert_eq!(sensor.frame().pixfmt, None);
    assert!(pool.jpeg_updates() >= 2);
}
