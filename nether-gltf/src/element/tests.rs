//! Tests for the element codec

use super::*;

// ========================================================================
// Sample Values
// ========================================================================

/// Boundary values per component type
trait Boundaries: Component {
    fn boundaries() -> Vec<Self>;
}

impl Boundaries for i8 {
    fn boundaries() -> Vec<Self> {
        vec![i8::MIN, -1, 0, 1, 42, i8::MAX]
    }
}

impl Boundaries for u8 {
    fn boundaries() -> Vec<Self> {
        vec![0, 1, 127, 128, 200, u8::MAX]
    }
}

impl Boundaries for i16 {
    fn boundaries() -> Vec<Self> {
        vec![i16::MIN, -300, 0, 1, 0x1234, i16::MAX]
    }
}

impl Boundaries for u16 {
    fn boundaries() -> Vec<Self> {
        vec![0, 1, 255, 256, 0xBEEF, u16::MAX]
    }
}

impl Boundaries for u32 {
    fn boundaries() -> Vec<Self> {
        vec![0, 1, 0xFFFF, 0x1_0000, 0xDEAD_BEEF, u32::MAX]
    }
}

impl Boundaries for f32 {
    fn boundaries() -> Vec<Self> {
        vec![
            0.0,
            -0.0,
            1.5,
            -2.25,
            f32::MIN,
            f32::MAX,
            f32::MIN_POSITIVE,
            f32::EPSILON,
            f32::INFINITY,
            f32::NEG_INFINITY,
        ]
    }
}

/// Write then read every element built from rotating boundary values.
///
/// The window is pre-filled with garbage to prove padding is zeroed and that
/// nothing past `BYTE_SIZE` is touched.
fn check_roundtrip<E>()
where
    E: Element,
    E::Component: Boundaries,
{
    let samples = <E::Component as Boundaries>::boundaries();
    let components = E::SHAPE.component_count() as usize;

    for shift in 0..samples.len() {
        let value = E::from_fn(|i| samples[(i + shift) % samples.len()]);

        let mut window = vec![0xAAu8; E::BYTE_SIZE + 4];
        value.write(&mut window);
        assert_eq!(&window[E::BYTE_SIZE..], &[0xAA; 4], "{:?} overran", E::SHAPE);

        let decoded = E::read(&window);
        for i in 0..components {
            let a = value.component(i);
            let b = decoded.component(i);
            // Compare through bytes so -0.0 and 0.0 stay distinct
            let mut ab = [0u8; 4];
            let mut bb = [0u8; 4];
            a.write_le(&mut ab);
            b.write_le(&mut bb);
            assert_eq!(ab, bb, "{:?}/{:?} component {i}", E::COMPONENT, E::SHAPE);
        }
    }
}

macro_rules! roundtrip_all_shapes {
    ($($name:ident => $c:ty),* $(,)?) => {$(
        #[test]
        fn $name() {
            check_roundtrip::<$c>();
            check_roundtrip::<[$c; 2]>();
            check_roundtrip::<[$c; 3]>();
            check_roundtrip::<[$c; 4]>();
            check_roundtrip::<[[$c; 2]; 2]>();
            check_roundtrip::<[[$c; 3]; 3]>();
            check_roundtrip::<[[$c; 4]; 4]>();
        }
    )*};
}

roundtrip_all_shapes! {
    test_roundtrip_i8 => i8,
    test_roundtrip_u8 => u8,
    test_roundtrip_i16 => i16,
    test_roundtrip_u16 => u16,
    test_roundtrip_u32 => u32,
    test_roundtrip_f32 => f32,
}

// ========================================================================
// Byte Layout
// ========================================================================

#[test]
fn test_little_endian_scalar() {
    let mut window = [0u8; 4];
    0x0102_0304u32.write(&mut window);
    assert_eq!(window, [0x04, 0x03, 0x02, 0x01]);
    assert_eq!(<u32 as Element>::read(&window), 0x0102_0304);

    let mut window = [0u8; 2];
    (-2i16).write(&mut window);
    assert_eq!(window, [0xFE, 0xFF]);
}

#[test]
fn test_u8_vec3_padding_is_zeroed() {
    let mut window = [0xFFu8; 4];
    [1u8, 2, 3].write(&mut window);
    assert_eq!(window, [1, 2, 3, 0]);
}

#[test]
fn test_u8_mat3_column_layout() {
    let m: [[u8; 3]; 3] = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
    let mut window = [0xFFu8; 12];
    m.write(&mut window);
    assert_eq!(window, [1, 2, 3, 0, 4, 5, 6, 0, 7, 8, 9, 0]);

    // Padding bytes are never read back as data
    window[3] = 0x55;
    window[7] = 0x55;
    window[11] = 0x55;
    assert_eq!(<[[u8; 3]; 3]>::read(&window), m);
}

#[test]
fn test_i16_mat3_column_layout() {
    let m: [[i16; 3]; 3] = [[1, -1, 2], [3, 4, 5], [-6, 7, 8]];
    let mut window = [0xFFu8; 24];
    m.write(&mut window);
    // Each column occupies 8 bytes: 6 of data, 2 of padding
    assert_eq!(&window[6..8], &[0, 0]);
    assert_eq!(&window[14..16], &[0, 0]);
    assert_eq!(&window[22..24], &[0, 0]);
    assert_eq!(i16::read_le(&window[8..]), 3);
    assert_eq!(i16::read_le(&window[16..]), -6);
}

#[test]
fn test_u8_mat2_column_layout() {
    let m: [[u8; 2]; 2] = [[10, 20], [30, 40]];
    let mut window = [0xFFu8; 8];
    m.write(&mut window);
    assert_eq!(window, [10, 20, 0, 0, 30, 40, 0, 0]);
}

#[test]
fn test_f32_mat4_is_column_major() {
    let m: [[f32; 4]; 4] = <[[f32; 4]; 4]>::from_fn(|i| i as f32);
    let mut window = [0u8; 64];
    m.write(&mut window);
    // Component 5 = column 1, row 1
    assert_eq!(f32::read_le(&window[20..]), 5.0);
    assert_eq!(m.component(5), m[1][1]);
}

#[test]
fn test_byte_size_constants() {
    assert_eq!(<[u8; 3]>::BYTE_SIZE, 4);
    assert_eq!(<[i16; 3]>::BYTE_SIZE, 8);
    assert_eq!(<[[u8; 2]; 2]>::BYTE_SIZE, 8);
    assert_eq!(<[[u32; 3]; 3]>::BYTE_SIZE, 36);
    assert_eq!(<u16 as Element>::BYTE_SIZE, 2);
}

// ========================================================================
// Conversions
// ========================================================================

#[test]
fn test_normalized_conversion() {
    assert_eq!(255u8.to_f32(true), 1.0);
    assert_eq!(0u8.to_f32(true), 0.0);
    assert_eq!(65535u16.to_f32(true), 1.0);
    assert_eq!(i8::MIN.to_f32(true), -1.0);
    assert_eq!(i16::MIN.to_f32(true), -1.0);
    assert_eq!(127i8.to_f32(true), 1.0);
    assert_eq!(200u8.to_f32(false), 200.0);
}

#[test]
fn test_u32_conversion() {
    assert_eq!(7u8.to_u32(), 7);
    assert_eq!(65535u16.to_u32(), 65535);
    assert_eq!((-1.0f32).to_u32(), 0);
}

#[test]
fn test_slice_helpers() {
    let values: Vec<[f32; 2]> = vec![[1.0, 2.0], [3.0, 4.0]];
    let mut packed = vec![0u8; 16];
    write_packed(&values, &mut packed);
    assert_eq!(&packed, bytemuck::cast_slice::<f32, u8>(&[1.0, 2.0, 3.0, 4.0]));

    // Every other element with a 16-byte stride
    let mut out = [[0.0f32; 2]; 1];
    read_strided(&packed, 8, 16, &mut out);
    assert_eq!(out, [[3.0, 4.0]]);
}
