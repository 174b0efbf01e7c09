//! Image types used as render targets and coverage masks
use crate::{Color, Rgb8};
use std::{any::type_name, fmt, io::Write};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Shape defines size and layout of the data inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Offset of the first element
    pub start: usize,
    /// Width of the image
    pub width: usize,
    /// Height of the image
    pub height: usize,
    /// How many elements we need to skip to get to the next row.
    pub row_stride: usize,
    /// How many elements we need to skip to get to the next column.
    pub col_stride: usize,
}

impl Shape {
    /// Create shape for a simple image with zero offset, and row-major order
    pub fn simple(height: usize, width: usize) -> Self {
        Shape {
            start: 0,
            width,
            height,
            row_stride: width,
            col_stride: 1,
        }
    }

    /// Convert row and column pair to the data offset
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        self.start + row * self.row_stride + col * self.col_stride
    }

    /// Get row and column pair by its index
    #[inline]
    pub fn nth(&self, n: usize) -> Option<(usize, usize)> {
        if self.width == 0 {
            return None;
        }
        let row = n / self.width;
        let col = n - row * self.width;
        (row < self.height).then_some((row, col))
    }

    /// Get the size of the image
    #[inline]
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

/// Trait common to all image types
pub trait Image {
    /// Pixel type
    type Pixel;

    /// Data containing image
    fn data(&self) -> &[Self::Pixel];

    /// Shape of the image
    fn shape(&self) -> Shape;

    /// Image size
    fn size(&self) -> Size {
        self.shape().size()
    }

    /// Image width
    fn width(&self) -> usize {
        self.shape().width
    }

    /// Image height
    fn height(&self) -> usize {
        self.shape().height
    }

    /// Get pixel at the specified row and column
    fn get(&self, row: usize, col: usize) -> Option<&Self::Pixel> {
        let offset = self.shape().offset(row, col);
        self.data().get(offset)
    }

    /// Iterate over pixels
    fn iter(&self) -> ImageIter<'_, Self::Pixel> {
        ImageIter {
            index: 0,
            shape: self.shape(),
            data: self.data(),
        }
    }

    /// Export the raster as row-major 8-bit RGB bytes
    ///
    /// This is the triple `(width, height, bytes)` external texture
    /// uploaders consume.
    fn to_rgb8(&self) -> Vec<u8>
    where
        Self::Pixel: Color,
        Self: Sized,
    {
        let rgb: Vec<Rgb8> = self.iter().map(|color| Rgb8(color.to_rgb())).collect();
        bytemuck::cast_vec(rgb)
    }

    /// Write image in PPM format
    fn write_ppm<W>(&self, mut out: W) -> Result<(), std::io::Error>
    where
        W: Write,
        Self::Pixel: Color,
        Self: Sized,
    {
        write!(out, "P6 {} {} 255 ", self.width(), self.height())?;
        for color in self.iter() {
            out.write_all(&color.to_rgb())?;
        }
        Ok(())
    }

    /// Write image in PNG format
    #[cfg(feature = "png")]
    fn write_png<W>(&self, out: W) -> Result<(), png::EncodingError>
    where
        W: Write,
        Self::Pixel: Color,
        Self: Sized,
    {
        let mut encoder = png::Encoder::new(out, self.width() as u32, self.height() as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        let mut stream_writer = writer.stream_writer()?;
        for color in self.iter() {
            stream_writer.write_all(&color.to_rgba())?;
        }
        stream_writer.flush()?;
        Ok(())
    }
}

/// Immutable iterator over pixels
pub struct ImageIter<'a, P> {
    index: usize,
    shape: Shape,
    data: &'a [P],
}

impl<'a, P> ImageIter<'a, P> {
    /// Get current (row, column) of the pixel
    pub fn position(&self) -> (usize, usize) {
        self.shape.nth(self.index).unwrap_or((self.shape.height, 0))
    }
}

impl<'a, P> Iterator for ImageIter<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        let (row, col) = self.shape.nth(self.index)?;
        self.index += 1;
        self.data.get(self.shape.offset(row, col))
    }
}

/// Mutable image interface
pub trait ImageMut: Image {
    /// Get a mutable slice of image data
    fn data_mut(&mut self) -> &mut [Self::Pixel];

    /// Get a mutable reference to the specified pixel
    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Self::Pixel> {
        let index = self.shape().offset(row, col);
        self.data_mut().get_mut(index)
    }

    /// Fill image with the provided pixel value
    fn fill(&mut self, pixel: Self::Pixel)
    where
        Self::Pixel: Copy,
    {
        let shape = self.shape();
        let data = self.data_mut();
        for row in 0..shape.height {
            for col in 0..shape.width {
                data[shape.offset(row, col)] = pixel;
            }
        }
    }

    /// Fill image with the default pixel value
    fn clear(&mut self)
    where
        Self::Pixel: Default + Copy,
    {
        self.fill(Default::default())
    }
}

/// Image that owns its data
#[derive(Clone)]
pub struct ImageOwned<P> {
    shape: Shape,
    data: Vec<P>,
}

impl<P> fmt::Debug for ImageOwned<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageOwned")
            .field("shape", &self.shape)
            .field("dtype", &type_name::<P>())
            .finish_non_exhaustive()
    }
}

impl<P> ImageOwned<P> {
    /// Construct owned image from the `data` and the `shape`
    pub fn new(shape: Shape, data: Vec<P>) -> Self {
        Self { shape, data }
    }

    /// Construct owned image filled with the default pixel
    pub fn new_default(size: Size) -> Self
    where
        P: Default + Clone,
    {
        Self {
            shape: Shape::simple(size.height, size.width),
            data: vec![Default::default(); size.height * size.width],
        }
    }

    /// Construct owned image filled with the provided pixel
    pub fn new_with(size: Size, pixel: P) -> Self
    where
        P: Clone,
    {
        Self {
            shape: Shape::simple(size.height, size.width),
            data: vec![pixel; size.height * size.width],
        }
    }

    /// Construct empty image of zero size
    pub fn empty() -> Self {
        Self {
            shape: Shape::simple(0, 0),
            data: Vec::new(),
        }
    }

    /// Convert image to a vector
    pub fn into_vec(self) -> Vec<P> {
        self.data
    }
}

impl<P> Image for ImageOwned<P> {
    type Pixel = P;

    fn shape(&self) -> Shape {
        self.shape
    }

    fn data(&self) -> &[Self::Pixel] {
        &self.data
    }
}

impl<P> ImageMut for ImageOwned<P> {
    fn data_mut(&mut self) -> &mut [Self::Pixel] {
        &mut self.data
    }
}

impl<'a, I> Image for &'a I
where
    I: Image + ?Sized,
{
    type Pixel = I::Pixel;

    fn shape(&self) -> Shape {
        (*self).shape()
    }

    fn data(&self) -> &[Self::Pixel] {
        (*self).data()
    }
}

impl<'a, I> Image for &'a mut I
where
    I: Image + ?Sized,
{
    type Pixel = I::Pixel;

    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn data(&self) -> &[Self::Pixel] {
        (**self).data()
    }
}

impl<'a, I> ImageMut for &'a mut I
where
    I: ImageMut + ?Sized,
{
    fn data_mut(&mut self) -> &mut [Self::Pixel] {
        (**self).data_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;

    #[test]
    fn test_shape() {
        let shape = Shape::simple(2, 3);
        assert_eq!(shape.offset(0, 0), 0);
        assert_eq!(shape.offset(1, 2), 5);
        assert_eq!(shape.nth(4), Some((1, 1)));
        assert_eq!(shape.nth(6), None);
        assert_eq!(shape.size(), Size::new(3, 2));
    }

    #[test]
    fn test_image_owned() {
        let mut img: ImageOwned<f64> = ImageOwned::new_default(Size::new(3, 2));
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        *img.get_mut(1, 2).unwrap() = 1.0;
        assert_eq!(*img.get(1, 2).unwrap(), 1.0);
        assert_eq!(img.iter().sum::<f64>(), 1.0);
        img.clear();
        assert_eq!(img.iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn test_to_rgb8() {
        let img = ImageOwned::new_with(Size::new(2, 1), Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(img.to_rgb8(), vec![255, 0, 0, 255, 0, 0]);
    }
}
