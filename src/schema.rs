// Diesel table definitions. Kept in sync with `DbContext::init_schema`.

diesel::table! {
    api_tokens (token_hash) {
        token_hash -> Text,
        user_id -> Text,
        restaurant_id -> Nullable<Text>,
        role -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    documents (id) {
        id -> Text,
        owner_id -> Text,
        title -> Text,
        mime_type -> Text,
        file_path -> Text,
        content_hash -> Text,
        file_size -> BigInt,
        page_count -> Nullable<Integer>,
        extracted_text -> Nullable<Text>,
        extraction_method -> Nullable<Text>,
        status -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    flashcard_sets (id) {
        id -> Text,
        owner_id -> Text,
        document_id -> Nullable<Text>,
        cards -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    highlights (id) {
        id -> Text,
        document_id -> Text,
        owner_id -> Text,
        page -> Nullable<Integer>,
        passage -> Text,
        note -> Nullable<Text>,
        color -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    invite_codes (code) {
        code -> Text,
        restaurant_id -> Text,
        created_by -> Text,
        used -> Bool,
        used_at -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    quiz_results (id) {
        id -> Text,
        quiz_id -> Text,
        user_id -> Nullable<Text>,
        participant_name -> Nullable<Text>,
        answers -> Text,
        score -> Integer,
        total -> Integer,
        shared -> Bool,
        created_at -> Text,
    }
}

diesel::table! {
    quizzes (id) {
        id -> Text,
        owner_id -> Text,
        document_id -> Nullable<Text>,
        title -> Text,
        questions -> Text,
        created_at -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    api_tokens,
    documents,
    flashcard_sets,
    highlights,
    invite_codes,
    quiz_results,
    quizzes,
);
