use crate::{error::Error, geometry::Point};
use num_traits::FromPrimitive;
use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Orientation {
    PortraitUp,
    PortraitDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Orientation {
    pub(crate) fn is_portrait(self) -> bool {
        matches!(self, Self::PortraitUp | Self::PortraitDown)
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "portrait-up" => Ok(Self::PortraitUp),
            "portrait-down" => Ok(Self::PortraitDown),
            "landscape-left" => Ok(Self::LandscapeLeft),
            "landscape-right" => Ok(Self::LandscapeRight),
            _ => Err(Error::UnknownOrientation(s.to_owned())),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum CameraFacing {
    Front,
    Back,
}

impl FromStr for CameraFacing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            _ => Err(Error::UnknownCameraFacing(s.to_owned())),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Width over height of the camera preview in portrait.
    fn aspect_ratio(self) -> f32 {
        match self {
            Self::Android => 3.0 / 4.0,
            Self::Ios => 9.0 / 16.0,
        }
    }

    /// Whether keypoints must be flipped horizontally before display.
    ///
    /// Matches the preview convention of the rendering layer bit for bit: Android previews are
    /// always flipped, as are back-camera previews on every platform.
    pub(crate) fn mirrors(self, facing: CameraFacing) -> bool {
        self == Self::Android || facing == CameraFacing::Back
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            _ => Err(Error::UnknownPlatform(s.to_owned())),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Dims {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Dims {
    pub(crate) const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Map a point from output tensor space to display space.
///
/// `tensor` holds the tensor dimensions for the current orientation, `preview` the preview
/// dimensions in portrait.
pub(crate) fn map_to_display(
    point: Point,
    tensor: Dims,
    preview: Dims,
    orientation: Orientation,
    facing: CameraFacing,
    platform: Platform,
) -> Point {
    let x = if platform.mirrors(facing) {
        tensor.width - point.x
    } else {
        point.x
    };
    let preview = if orientation.is_portrait() {
        preview
    } else {
        preview.transposed()
    };
    Point::new(
        x / tensor.width * preview.width,
        point.y / tensor.height * preview.height,
    )
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct CoordinateMapper {
    platform: Platform,
    tensor: Dims,
    preview: Dims,
}

impl CoordinateMapper {
    pub(crate) fn new(platform: Platform, tensor_width: f32, screen_width: f32) -> Self {
        let aspect_ratio = platform.aspect_ratio();
        Self {
            platform,
            tensor: Dims::new(tensor_width, tensor_width / aspect_ratio),
            preview: Dims::new(screen_width, screen_width / aspect_ratio),
        }
    }

    /// Tensor dimensions as seen by the estimator in `orientation`.
    ///
    /// Android reports frames in portrait layout regardless of the device orientation.
    pub(crate) fn tensor_dims(&self, orientation: Orientation) -> Dims {
        if orientation.is_portrait() || self.platform == Platform::Android {
            self.tensor
        } else {
            self.tensor.transposed()
        }
    }

    pub(crate) fn preview_dims(&self) -> Dims {
        self.preview
    }

    pub(crate) fn map(&self, point: Point, orientation: Orientation, facing: CameraFacing) -> Point {
        map_to_display(
            point,
            self.tensor_dims(orientation),
            self.preview,
            orientation,
            facing,
            self.platform,
        )
    }
}

/// Current device orientation and camera facing.
///
/// Written by the orientation event source or a camera switch and read once per frame; clones
/// share the same values.
#[derive(Debug, Clone)]
pub(crate) struct DeviceState {
    orientation: Arc<AtomicU8>,
    facing: Arc<AtomicU8>,
}

impl DeviceState {
    pub(crate) fn new(orientation: Orientation, facing: CameraFacing) -> Self {
        Self {
            orientation: Arc::new(AtomicU8::new(orientation as u8)),
            facing: Arc::new(AtomicU8::new(facing as u8)),
        }
    }

    pub(crate) fn orientation(&self) -> Orientation {
        Orientation::from_u8(self.orientation.load(Ordering::Acquire))
            .unwrap_or(Orientation::PortraitUp)
    }

    pub(crate) fn set_orientation(&self, orientation: Orientation) {
        self.orientation.store(orientation as u8, Ordering::Release);
    }

    pub(crate) fn facing(&self) -> CameraFacing {
        CameraFacing::from_u8(self.facing.load(Ordering::Acquire)).unwrap_or(CameraFacing::Front)
    }

    pub(crate) fn set_facing(&self, facing: CameraFacing) {
        self.facing.store(facing as u8, Ordering::Release);
    }
}
