//! Diesel table definitions for the booking schema.

diesel::table! {
    rooms (id) {
        id -> Int8,
        room_name -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    reservations (id) {
        id -> Int8,
        first_name -> Text,
        last_name -> Text,
        email -> Text,
        phone -> Text,
        start_date -> Date,
        end_date -> Date,
        room_id -> Int8,
        processed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    room_restrictions (id) {
        id -> Int8,
        start_date -> Date,
        end_date -> Date,
        room_id -> Int8,
        reservation_id -> Nullable<Int8>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(reservations -> rooms (room_id));
diesel::joinable!(room_restrictions -> rooms (room_id));

diesel::allow_tables_to_appear_in_same_query!(rooms, reservations, room_restrictions);
