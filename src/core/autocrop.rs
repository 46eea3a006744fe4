//! アスペクト比を保ったままウィンドウをバッファに収める計算
//!
//! ウィンドウの長辺/短辺比の整数倍のうち、整数に 1% 以内で近いものを最大 100 回まで探し、
//! その (長辺, 短辺) の組を1ステップとして幅と高さを同時に削ります。

/// 比率探索の最大反復回数
pub const MAX_RATIO_ITERATIONS: u32 = 100;

/// 比率探索の許容誤差
pub const RATIO_TOLERANCE: f32 = 0.01;

/// 切り出し後のウィンドウ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub u: u32,
    pub v: u32,
}

/// 1回の縮小で削る (幅, 高さ)
///
/// 幅か高さが 0 の場合は `None`。
pub fn crop_step(width: u32, height: u32) -> Option<(u32, u32)> {
    let longer = width.max(height);
    let shorter = width.min(height);
    if shorter == 0 {
        return None;
    }

    let aspect = longer as f32 / shorter as f32;
    let mut r = aspect;
    let mut c = 1u32;
    let mut best_r = r;
    let mut best_c = c;
    let mut best_err = f32::MAX;

    for _ in 0..MAX_RATIO_ITERATIONS {
        let err = (r - r.round()).abs();
        if err <= best_err {
            best_err = err;
            best_r = r;
            best_c = c;
        }
        if best_err <= RATIO_TOLERANCE {
            break;
        }
        r += aspect;
        c += 1;
    }

    let long_step = best_r.round() as u32;
    if width > height {
        Some((long_step, best_c))
    } else {
        Some((best_c, long_step))
    }
}

/// ウィンドウを `capacity` バイトに収まるまで縮め、中央に寄せ直します
///
/// 幅・高さ・原点はすべて偶数になります。収まる前に幅か高さが尽きる場合は `None`。
pub fn crop_window(window: CropWindow, bpp: u32, capacity: u64) -> Option<CropWindow> {
    let (u_sub, v_sub) = crop_step(window.u, window.v)?;
    let bpp = u64::from(bpp);
    let mut u = u64::from(window.u);
    let mut v = u64::from(window.v);

    while u * v * bpp > capacity || u % 2 != 0 || v % 2 != 0 {
        if u <= u64::from(u_sub) || v <= u64::from(v_sub) {
            return None;
        }
        u -= u64::from(u_sub);
        v -= u64::from(v_sub);
    }

    // u, v は元の値以下なので u32 に収まる
    let u = u as u32;
    let v = v as u32;
    let mut x = window.x + (window.u - u) / 2;
    let mut y = window.y + (window.v - v) / 2;
    if x % 2 != 0 {
        x -= 1;
    }
    if y % 2 != 0 {
        y -= 1;
    }

    Some(CropWindow { x, y, u, v })
}
