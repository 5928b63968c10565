//! Class-name table for the pretrained detection model.
//!
//! Model outputs carry class ids; the names live in a table that ships with
//! the model. The bundled default is the 80-class COCO vocabulary. A
//! custom-trained model (e.g. one with a `door` class) supplies its own
//! table through configuration and the rest of the pipeline follows it.

/// COCO class names in model output order.
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Class-id to class-name mapping for one model.
#[derive(Clone, Debug)]
pub struct ClassTable {
    names: Vec<String>,
}

impl ClassTable {
    /// The COCO-80 table the stock pretrained models emit.
    pub fn coco() -> Self {
        Self::from_names(COCO_CLASSES.iter().map(|name| name.to_string()).collect())
    }

    /// A custom table, in model output order.
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Look up a class name by model output id.
    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::coco()
    }
}
