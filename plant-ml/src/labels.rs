//! PlantVillage class names, index-aligned with the classifier's logits.

/// Output index `i` of the network is the class `CLASS_NAMES[i]`.
pub const CLASS_NAMES: &[&str] = &[
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Background_without_leaves",
    "Blueberry___healthy",
    "Cherry___Powdery_mildew",
    "Cherry___healthy",
    "Corn___Cercospora_leaf_spot Gray_leaf_spot",
    "Corn___Common_rust",
    "Corn___Northern_Leaf_Blight",
    "Corn___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

pub fn class_name(index: usize) -> Option<&'static str> {
    CLASS_NAMES.get(index).copied()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn class_names_are_unique() {
        let unique: HashSet<_> = CLASS_NAMES.iter().collect();
        assert_eq!(unique.len(), CLASS_NAMES.len());
    }

    #[test]
    fn class_table_keeps_training_order() {
        assert_eq!(CLASS_NAMES.len(), 39);
        assert_eq!(class_name(0), Some("Apple___Apple_scab"));
        assert_eq!(class_name(4), Some("Background_without_leaves"));
        assert_eq!(class_name(19), Some("Pepper,_bell___Bacterial_spot"));
        assert_eq!(class_name(38), Some("Tomato___healthy"));
        assert_eq!(class_name(39), None);
    }
}
