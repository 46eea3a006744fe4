/// 自動クロップの統合テスト
use anyhow::Result;
use camera_sensor_control::core::pixformat::OutputTraits;
use camera_sensor_control::core::types::BufferCount;
use camera_sensor_control::hardware::mock::{
    MockBoard, MockBus, MockClock, MockDriver, MockFramePool, MockPort,
};
use camera_sensor_control::hardware::{ChipId, FramePool, SensorFamily};
use camera_sensor_control::{FrameSize, PixFormat, Sensor, SensorConfig, SensorError, SensorHal};

type TestSensor = Sensor<MockBus, MockPort, MockFramePool, MockClock>;

fn setup(capacity: u32) -> (TestSensor, MockFramePool) {
    let (sensor, pool, _driver) = setup_with(capacity, SensorConfig::default());
    (sensor, pool)
}

fn setup_with(capacity: u32, config: SensorConfig) -> (TestSensor, MockFramePool, MockDriver) {
    let board = MockBoard::new();
    let pool = MockFramePool::new(capacity);
    let driver = MockDriver::new();
    let hal = SensorHal::new(board.bus(), MockPort::new(), pool.clone(), MockClock::new());
    let mut sensor = Sensor::new(hal, config.with_settle_delay_ms(0));
    sensor.install_driver(SensorFamily::Mt9v0xx, ChipId::MT9V0X4, Box::new(driver.clone()));
    (sensor, pool, driver)
}

#[test]
fn test_window_that_fits_is_untouched() -> Result<()> {
    let (mut sensor, _pool) = setup(1_000_000);
    sensor.set_pixformat(PixFormat::Rgb565)?;
    sensor.set_framesize(FrameSize::Qvga)?;
    let frame = *sensor.frame();

    sensor.auto_crop_framebuffer()?;

    assert_eq!(sensor.frame(), &frame);
    assert_eq!(sensor.get_pixformat(), Some(PixFormat::Rgb565));
    Ok(())
}

#[test]
fn test_color_falls_back_to_bayer() -> Result<()> {
    // Given: 752x480 RGB565 を収めたあと、バッファを2枚に分けた
    let (mut sensor, pool) = setup(800_000);
    sensor.set_pixformat(PixFormat::Rgb565)?;
    sensor.set_framesize(FrameSize::Wvga2)?;
    sensor.set_framebuffers(BufferCount::Exact(2))?;
    assert_eq!(sensor.check_framebuffer_size(), Err(SensorError::FramebufferOverflow));

    // When
    sensor.auto_crop_framebuffer()?;

    // Then: Bayer にするだけで収まる
    assert_eq!(sensor.get_pixformat(), Some(PixFormat::Bayer));
    let frame = sensor.frame();
    assert_eq!((frame.x, frame.y, frame.u, frame.v), (0, 0, 752, 480));
    assert_eq!(sensor.check_framebuffer_size(), Ok(()));
    assert!(u64::from(frame.u) * u64::from(frame.v) <= u64::from(pool.buffer_size()));
    Ok(())
}

#[test]
fn test_grayscale_window_is_cropped_centered() -> Result<()> {
    // Given: 752x480 グレースケールのあとでメモリが減った
    let (mut sensor, pool) = setup(400_000);
    sensor.set_pixformat(PixFormat::Grayscale)?;
    sensor.set_framesize(FrameSize::Wvga2)?;
    pool.set_capacity(200_000);

    // When
    sensor.auto_crop_framebuffer()?;

    // Then: 縦横比を保って中央に縮小
    let frame = sensor.frame();
    assert_eq!((frame.x, frame.y, frame.u, frame.v), (140, 90, 470, 300));
    assert_eq!((frame.w, frame.h), (470, 300));
    assert!(sensor.get_cropped());
    assert_eq!(sensor.check_framebuffer_size(), Ok(()));
    assert_eq!(pool.frame_size(), 470 * 300);
    Ok(())
}

#[test]
fn test_color_switches_to_bayer_then_crops() -> Result<()> {
    let (mut sensor, pool) = setup(721_920);
    sensor.set_pixformat(PixFormat::Rgb565)?;
    sensor.set_framesize(FrameSize::Wvga2)?;
    pool.set_capacity(300_000);

    sensor.auto_crop_framebuffer()?;

    assert_eq!(sensor.get_pixformat(), Some(PixFormat::Bayer));
    let frame = sensor.frame();
    assert!(u64::from(frame.u) * u64::from(frame.v) <= 300_000);
    assert_eq!(frame.u % 2, 0);
    assert_eq!(frame.v % 2, 0);
    assert_eq!(frame.x % 2, 0);
    assert_eq!(frame.y % 2, 0);
    // 縦横比は 47:30 のまま
    assert_eq!(frame.u * 30, frame.v * 47);
    assert_eq!(sensor.check_framebuffer_size(), Ok(()));
    Ok(())
}

#[test]
fn test_unfittable_window_is_left_alone() -> Result<()> {
    let (mut sensor, pool) = setup(400_000);
    sensor.set_pixformat(PixFormat::Grayscale)?;
    sensor.set_framesize(FrameSize::Wvga2)?;
    let frame = *sensor.frame();
    pool.set_capacity(16);

    assert_eq!(sensor.auto_crop_framebuffer(), Err(SensorError::FramebufferOverflow));
    assert_eq!(sensor.frame(), &frame);
    Ok(())
}

#[test]
fn test_unfittable_color_window_keeps_format() -> Result<()> {
    // Given: RGB565 のあとでメモリがほぼ無くなった
    let (mut sensor, pool, driver) = setup_with(800_000, SensorConfig::default());
    sensor.set_pixformat(PixFormat::Rgb565)?;
    sensor.set_framesize(FrameSize::Wvga2)?;
    let frame = *sensor.frame();
    pool.set_capacity(16);

    // When
    let result = sensor.auto_crop_framebuffer();

    // Then: Bayer にも切り替えない
    assert_eq!(result, Err(SensorError::FramebufferOverflow));
    assert_eq!(sensor.get_pixformat(), Some(PixFormat::Rgb565));
    assert_eq!(sensor.frame(), &frame);
    assert_eq!(driver.call_count("set_pixformat"), 1);
    Ok(())
}

#[test]
fn test_crop_uses_wider_sensor_output() -> Result<()> {
    // Given: 2バイト/ピクセルで出力されるグレースケール
    let (mut sensor, pool, driver) = setup_with(800_000, SensorConfig::default());
    driver.set_output_traits(OutputTraits {
        mono_bpp: 2,
        ..OutputTraits::default()
    });
    sensor.set_pixformat(PixFormat::Grayscale)?;
    sensor.set_framesize(FrameSize::Wvga2)?;
    pool.set_capacity(300_000);

    // When
    sensor.auto_crop_framebuffer()?;

    // Then: 入力側の2バイトで収まるまで縮める
    let frame = sensor.frame();
    assert_eq!((frame.x, frame.y, frame.u, frame.v), (140, 90, 470, 300));
    assert_eq!(frame.frame_size, 470 * 300 * 2);
    assert_eq!(pool.frame_size(), 470 * 300 * 2);
    assert!(u64::from(frame.frame_size) <= 300_000);
    assert_eq!(sensor.check_framebuffer_size(), Ok(()));
    Ok(())
}

#[test]
fn test_without_hardware_crop_window_is_kept() -> Result<()> {
    // Given: ポートがクロップできない構成
    let config = SensorConfig::default().with_hw_crop(false);
    let (mut sensor, pool, _driver) = setup_with(400_000, config);
    sensor.set_pixformat(PixFormat::Grayscale)?;
    sensor.set_framesize(FrameSize::Wvga2)?;
    let frame = *sensor.frame();
    pool.set_capacity(200_000);

    // When
    let result = sensor.auto_crop_framebuffer();

    // Then: 縮めても受信量は変わらないので何も変更しない
    assert_eq!(result, Err(SensorError::FramebufferOverflow));
    assert_eq!(sensor.frame(), &frame);
    assert_eq!(sensor.frame().frame_size, 752 * 480);
    assert_eq!(pool.frame_size(), 752 * 480);
    Ok(())
}

#[test]
fn test_without_hardware_crop_color_falls_back_to_bayer() -> Result<()> {
    let config = SensorConfig::default().with_hw_crop(false);
    let (mut sensor, pool, _driver) = setup_with(800_000, config);
    sensor.set_pixformat(PixFormat::Rgb565)?;
    sensor.set_framesize(FrameSize::Wvga2)?;
    pool.set_capacity(400_000);

    sensor.auto_crop_framebuffer()?;

    assert_eq!(sensor.get_pixformat(), Some(PixFormat::Bayer));
    assert!(!sensor.get_cropped());
    assert_eq!(pool.frame_size(), 752 * 480);
    assert_eq!(sensor.check_framebuffer_size(), Ok(()));
    Ok(())
}

#[test]
fn test_jpeg_is_never_cropped() -> Result<()> {
    let (mut sensor, pool) = setup(400_000);
    sensor.set_pixformat(PixFormat::Jpeg)?;
    sensor.set_framesize(FrameSize::Vga)?;
    pool.set_capacity(1_000);

    sensor.auto_crop_framebuffer()?;

    assert!(!sensor.get_cropped());
    Ok(())
}
