/// Fold longitude into [-180, 180)
#[inline(always)]
pub fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Nearest multiple of 360 degrees, i.e. the world copy a longitude sits in
#[inline(always)]
pub fn world_offset(lon: f64) -> f64 {
    (lon / 360.0).round() * 360.0
}

/// True when both coordinates are finite and inside [-180,180]x[-90,90]
#[inline(always)]
pub fn is_valid_lon_lat(lon: f64, lat: f64) -> bool {
    lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat)
}
